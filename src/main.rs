//! # folio CLI
//!
//! Usage:
//!   folio request.json -o record.pdf
//!   echo '{ ... }' | folio
//!   folio --example > request.json
//!
//! Without `-o`, the output name is derived from the request identifiers.

use std::env;
use std::fs;
use std::io::{self, Read};

use folio::model::DocumentRequest;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_record_json());
        return;
    }

    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).expect("Failed to read input file")
    } else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .expect("Failed to read stdin");
        buf
    };

    let request: DocumentRequest = match serde_json::from_str(&input) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("✗ {}", folio::FolioError::from(e));
            std::process::exit(1);
        }
    };

    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| format!("{}.pdf", request.meta.file_name()));

    let pdf_bytes = folio::render(&request);
    fs::write(&output_path, &pdf_bytes).expect("Failed to write PDF");
    eprintln!("✓ Written {} bytes to {}", pdf_bytes.len(), output_path);
}

fn example_record_json() -> &'static str {
    r##"{
  "meta": {
    "category": "cse",
    "expNo": "7",
    "title": "Implementation of Dijkstra's Shortest Path Algorithm",
    "date": "2026-02-14",
    "rollNo": "21CS042"
  },
  "config": {
    "pageSize": "A4",
    "margins": "wide",
    "images": { "heightCap": 0.8, "captions": true },
    "decorations": {
      "pageBorder": true,
      "headerBox": true,
      "footer": { "pageNumbers": true, "attribution": "Department of CSE" },
      "marksTable": { "imageCategories": ["year-1"] }
    }
  },
  "sections": [
    {
      "heading": "Aim:",
      "content": {
        "type": "Text",
        "body": "To implement Dijkstra's shortest path algorithm and verify it on a weighted graph of ten vertices."
      }
    },
    {
      "heading": "Procedure:",
      "content": {
        "type": "Text",
        "body": "1. Represent the graph as an adjacency list.\n2. Initialise all distances to infinity except the source.\n3. Repeatedly extract the nearest unvisited vertex and relax its edges.\n4. Record the distance table after every extraction."
      }
    },
    {
      "heading": "Program:",
      "pageBreak": "always-fresh",
      "content": {
        "type": "Images",
        "images": [
          "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg=="
        ]
      }
    },
    {
      "heading": "Result:",
      "pageBreak": "always-fresh",
      "content": {
        "type": "Text",
        "body": "The algorithm was implemented and the computed shortest paths matched the expected distances for every test graph."
      }
    }
  ]
}
"##
}
