pub const HELP: &str = "svg2paths

USAGE:
    svg2paths [OPTIONS] [INPUT]

OPTIONS:
    -h, --help\t\tPrint this message
    -p, --polylines\tPrint the flattened polylines instead of SVG
    -t, --tolerance <T>\tFlattening tolerance (default: 0.15)

INPUT is a file path or an SVG string. Without INPUT, stdin is read.

Returns the SVG with absolute path data, or a 3D JSON array of polylines.";

fn polylines_json(lines: &[svg2paths::Polyline]) -> String {
    let mut out = String::with_capacity(lines.len() * 36);

    out.push_str("[\n");
    for (idx, line) in lines.iter().enumerate() {
        out.push_str("  [\n");
        let points: Vec<String> = line
            .iter()
            .map(|svg2paths::Point { x, y }| format!("    [{}, {}]", x, y))
            .collect();
        out.push_str(&points.join(",\n"));
        out.push_str("\n  ]");
        if idx != lines.len() - 1 {
            out.push(',');
        }
        out.push('\n');
    }
    out.push(']');
    out
}

fn main() {
    fn inner() -> Result<(), Box<dyn std::error::Error>> {
        env_logger::init();

        let mut input = None;
        let mut polylines = false;
        let mut tolerance = svg2paths::FLATTENING_TOLERANCE;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => {
                    println!("{}", HELP);
                    return Ok(());
                }
                "-p" | "--polylines" => polylines = true,
                "-t" | "--tolerance" => {
                    let value = args.next().ok_or("Missing value for --tolerance")?;
                    tolerance = value.parse()?;
                }
                _ => {
                    input = Some(arg);
                }
            }
        }

        let mut input = if let Some(input) = input {
            input
        } else {
            let mut buffer = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)?;
            buffer
        };

        if std::path::Path::new(&input).exists() {
            input = std::fs::read_to_string(&input)?;
        }

        // Problems within single shapes are logged as warnings while parsing
        let document = svg2paths::parse(&input)?;

        if polylines {
            println!("{}", polylines_json(&document.polylines(tolerance)));
        } else {
            println!("{}", document.to_svg()?);
        }

        Ok(())
    }

    if let Err(e) = inner() {
        eprintln!("{}", e);
        std::process::exit(2);
    }
}
