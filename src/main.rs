//! # Maquette CLI
//!
//! Usage:
//!   maquette layout.json -o output.svg
//!   maquette layout.json --vars data.json --values -o output.svg
//!   echo '{ ... }' | maquette -o output.svg
//!   maquette --example > starter.json

use maquette::RenderMode;
use serde_json::Value;
use std::env;
use std::fs;
use std::io::{self, Read};

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_layout_json());
        return;
    }

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).expect("Failed to read input file")
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).expect("Failed to read stdin");
        buf
    };

    // Variable context, empty object when no --vars file given
    let data: Value = args
        .windows(2)
        .find(|w| w[0] == "--vars")
        .map(|w| {
            let raw = fs::read_to_string(&w[1]).expect("Failed to read vars file");
            serde_json::from_str(&raw).expect("Failed to parse vars file")
        })
        .unwrap_or_else(|| Value::Object(Default::default()));

    let mode = if args.iter().any(|a| a == "--values") {
        RenderMode::Values
    } else {
        RenderMode::Tokens
    };

    // Parse output path
    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "output.svg".to_string());

    // Render
    match maquette::render_json(&input, &data, mode) {
        Ok(svg) => {
            fs::write(&output_path, &svg).expect("Failed to write SVG");
            eprintln!("✓ Written {} bytes to {}", svg.len(), output_path);
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn example_layout_json() -> &'static str {
    r##"{
  "elements": [
    {
      "id": "el-heading",
      "type": "text",
      "x": 40,
      "y": 40,
      "width": 400,
      "height": 48,
      "fontSize": 24,
      "textStyle": { "fontWeight": 700 },
      "text": "Order confirmation"
    },
    {
      "id": "el-greeting",
      "type": "text",
      "x": 40,
      "y": 110,
      "width": 400,
      "height": 40,
      "fontSize": 14,
      "text": "Hello {{customer.name}}, your order {{order.id}} has shipped."
    },
    {
      "id": "el-panel",
      "type": "rectangle",
      "x": 40,
      "y": 170,
      "width": 360,
      "height": 120,
      "fillColor": "#f5f5f5",
      "borderColor": "#111827",
      "borderWidth": 1,
      "borderRadius": 8,
      "borderStyle": "solid"
    },
    {
      "id": "el-total",
      "type": "variable",
      "x": 60,
      "y": 190,
      "fontSize": 18,
      "variable": "order.total"
    }
  ],
  "metadata": {
    "version": 1,
    "createdAt": 0,
    "textCount": 2,
    "rectangleCount": 1,
    "variableCount": 1,
    "hasCustomStyles": false
  }
}"##
}
