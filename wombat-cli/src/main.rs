//! Wombat CLI
//!
//! Parse an HTML document and print it, or the elements a selector picks,
//! as an indented tree, markup, text or JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use serde::Serialize;
use wombat::{DomParser, Node, NodeTypeCode, ParseOptions, TEXT_HTML};

/// Wombat: parse, query and dump HTML documents
#[derive(Parser, Debug)]
#[command(name = "wombat")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the DOM tree of a file
    wombat ./index.html

    # Print the markup of every link
    wombat ./index.html --select 'a[href]' --format html

    # Dump inline HTML as JSON
    wombat --html '<ul><li>a<li>b</ul>' --format json

    # Show parse errors while parsing
    wombat --warnings --html '<p></div>'
"#)]
struct Cli {
    /// Path to an HTML file
    #[arg(value_name = "FILE", conflicts_with = "html")]
    path: Option<PathBuf>,

    /// Parse this HTML string instead of a file
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// Only output the elements matching this selector
    #[arg(short, long, value_name = "SELECTOR")]
    select: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Tree)]
    format: Format,

    /// Report parse errors on stderr
    #[arg(short = 'W', long)]
    warnings: bool,

    /// Parse with scripting disabled, so `noscript` content becomes markup
    #[arg(long)]
    no_scripting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Indented, colored node tree
    Tree,
    /// Serialized markup (outerHTML)
    Html,
    /// Text content
    Text,
    /// Node tree as JSON
    Json,
}

/// JSON shape of one node and its subtree.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum JsonNode {
    Document {
        children: Vec<JsonNode>,
    },
    DocumentFragment {
        children: Vec<JsonNode>,
    },
    Doctype {
        name: String,
        #[serde(rename = "publicId")]
        public_id: String,
        #[serde(rename = "systemId")]
        system_id: String,
    },
    Element {
        #[serde(rename = "tagName")]
        tag_name: String,
        attributes: BTreeMap<String, String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<JsonNode>,
    },
    Text {
        content: String,
    },
    Comment {
        content: String,
    },
}

impl JsonNode {
    fn from_node(node: &Node) -> Self {
        let children = || node.child_nodes().iter().map(Self::from_node).collect();
        match node.node_type() {
            NodeTypeCode::Document => Self::Document {
                children: children(),
            },
            NodeTypeCode::DocumentFragment => Self::DocumentFragment {
                children: children(),
            },
            NodeTypeCode::DocumentType => Self::Doctype {
                name: node.name().unwrap_or_default(),
                public_id: node.public_id().unwrap_or_default(),
                system_id: node.system_id().unwrap_or_default(),
            },
            NodeTypeCode::Element => Self::Element {
                tag_name: node.local_name().unwrap_or_default(),
                attributes: node
                    .get_attribute_names()
                    .into_iter()
                    .filter_map(|name| node.get_attribute(&name).map(|value| (name, value)))
                    .collect(),
                children: children(),
            },
            NodeTypeCode::Text => Self::Text {
                content: node.data(),
            },
            NodeTypeCode::Comment => Self::Comment {
                content: node.data(),
            },
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let html = read_input(&cli)?;

    let options = ParseOptions::default()
        .with_parse_error_reporting(cli.warnings)
        .with_scripting(!cli.no_scripting);
    let document = DomParser::with_options(options)
        .parse_from_string(&html, TEXT_HTML)
        .context("failed to parse document")?;

    let nodes = match cli.select.as_deref() {
        Some(selector) => document
            .query_selector_all(selector)
            .with_context(|| format!("invalid --select {selector:?}"))?,
        None => vec![document.as_node().clone()],
    };
    if nodes.is_empty() {
        eprintln!("{}", "no elements matched".yellow());
        return Ok(());
    }

    match cli.format {
        Format::Tree => {
            for node in &nodes {
                print_tree(node, 0);
            }
        }
        Format::Html => {
            for node in &nodes {
                println!("{}", node.outer_html());
            }
        }
        Format::Text => {
            for node in &nodes {
                println!("{}", text_of(node));
            }
        }
        Format::Json => {
            let json: Vec<JsonNode> = nodes.iter().map(JsonNode::from_node).collect();
            let out = if cli.select.is_some() {
                serde_json::to_string_pretty(&json)
            } else {
                serde_json::to_string_pretty(&json[0])
            };
            println!("{}", out.context("failed to serialize JSON")?);
        }
    }

    Ok(())
}

/// The HTML to parse, from `--html` or the file argument.
fn read_input(cli: &Cli) -> Result<String> {
    if let Some(html) = &cli.html {
        return Ok(html.clone());
    }
    let Some(path) = &cli.path else {
        bail!("expected a FILE argument or --html");
    };
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Text content, taken from the document element for a document.
fn text_of(node: &Node) -> String {
    node.text_content()
        .or_else(|| node.first_element_child().and_then(|root| root.text_content()))
        .unwrap_or_default()
}

/// Print `node` and its subtree, one node per line.
fn print_tree(node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    match node.node_type() {
        NodeTypeCode::Document | NodeTypeCode::DocumentFragment => {
            println!("{indent}{}", node.node_name().bold());
        }
        NodeTypeCode::DocumentType => {
            println!("{indent}{}", format!("<!DOCTYPE {}>", node.node_name()).dimmed());
        }
        NodeTypeCode::Element => {
            let mut line = format!("<{}", node.local_name().unwrap_or_default())
                .cyan()
                .to_string();
            for name in node.get_attribute_names() {
                let value = node.get_attribute(&name).unwrap_or_default();
                line.push_str(&format!(" {}={}", name.yellow(), format!("{value:?}").green()));
            }
            line.push_str(&">".cyan().to_string());
            println!("{indent}{line}");
        }
        NodeTypeCode::Text => {
            let data = node.data();
            if data.trim().is_empty() {
                return;
            }
            println!("{indent}{}", format!("{data:?}").white());
        }
        NodeTypeCode::Comment => {
            println!("{indent}{}", format!("<!-- {} -->", node.data()).dimmed());
        }
    }
    for child in node.child_nodes() {
        print_tree(&child, depth + 1);
    }
}
