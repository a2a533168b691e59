use schemagraph::{
    Diagnostics, InferenceOptions, OverrideDocument, TargetLanguage, enrich_entities,
    entities_from_schema, generate_mapping_file, parse_ddl_file,
};
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <schema.sql> [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <file>              Output file (default: stdout)");
    eprintln!("  -e, --entities                   Emit field-oriented entities instead of tables");
    eprintln!("  -l, --lang <java|kotlin>         Target language for entity field types (default: java)");
    eprintln!("  -m, --mapping <file>             Relationship override document (implies --entities)");
    eprintln!("  -t, --template <file>            Write a relationship template for the parsed entities");
    eprintln!("  -j, --junction-max-columns <n>   Column cutoff for junction tables, or 'any' (default: 3)");
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage(&args[0]);
    }

    let input_path = &args[1];
    let mut output_path: Option<String> = None;
    let mut mapping_path: Option<String> = None;
    let mut template_path: Option<String> = None;
    let mut emit_entities = false;
    let mut language = TargetLanguage::default();
    let mut options = InferenceOptions::default();

    let mut i = 2;
    while i < args.len() {
        let value = |i: usize| -> String {
            match args.get(i + 1) {
                Some(v) => v.clone(),
                None => {
                    eprintln!("Missing value for {}", args[i]);
                    process::exit(1);
                }
            }
        };
        match args[i].as_str() {
            "-o" | "--output" => {
                output_path = Some(value(i));
                i += 1;
            }
            "-e" | "--entities" => emit_entities = true,
            "-l" | "--lang" => {
                language = value(i).parse().unwrap_or_else(|e| {
                    eprintln!("{}", e);
                    process::exit(1);
                });
                i += 1;
            }
            "-m" | "--mapping" => {
                mapping_path = Some(value(i));
                emit_entities = true;
                i += 1;
            }
            "-t" | "--template" => {
                template_path = Some(value(i));
                i += 1;
            }
            "-j" | "--junction-max-columns" => {
                let raw = value(i);
                options.junction_max_columns = match raw.as_str() {
                    "any" => None,
                    n => Some(n.parse().unwrap_or_else(|_| {
                        eprintln!("Invalid column count: {}", n);
                        process::exit(1);
                    })),
                };
                i += 1;
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                usage(&args[0]);
            }
        }
        i += 1;
    }

    let mut diagnostics = Diagnostics::new();
    let schema = match parse_ddl_file(input_path, &options, &mut diagnostics) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let mut entities = entities_from_schema(&schema, &language);

    if let Some(path) = &template_path {
        if let Err(e) = generate_mapping_file(&entities).write_to(path) {
            eprintln!("{}", e);
            process::exit(1);
        }
    }

    if let Some(path) = &mapping_path {
        let overrides = OverrideDocument::load_or_empty(path, &mut diagnostics);
        enrich_entities(&mut entities, &overrides, &mut diagnostics);
    }

    let json = if emit_entities {
        serde_json::to_string_pretty(&entities)
    } else {
        serde_json::to_string_pretty(&schema)
    };
    let json = match json {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to serialize schema graph: {}", e);
            process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                eprintln!("Failed to write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => println!("{}", json),
    }

    if !diagnostics.is_empty() {
        eprintln!("{} warning(s)", diagnostics.len());
    }
}
