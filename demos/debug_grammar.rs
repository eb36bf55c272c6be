use pest::Parser;
use tikzmac::{Rule, TikzParser};

fn main() {
    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| r"\draw[->] (A) -- node[above]{$F$} ($(A)!0.5!(B)$) --++ (1,0);".to_string());

    println!("Parsing: {}", input);
    println!();

    match TikzParser::parse(Rule::draw_macro, &input) {
        Ok(pairs) => {
            println!(
                "{}",
                pest_ascii_tree::into_ascii_tree(pairs.clone()).unwrap()
            );
        }
        Err(e) => {
            eprintln!("Parse error: {}", e);
        }
    }

    // Path bodies are scanned token by token; show how each coordinate parses
    for expr in ["A+B-|C", "$(A)!0.5!(B)$", "intersection of A--B and C--D", "30:2"] {
        println!("\ncoordinate_expr: {}", expr);
        match TikzParser::parse(Rule::coordinate_expr, expr) {
            Ok(pairs) => println!("{}", pest_ascii_tree::into_ascii_tree(pairs).unwrap()),
            Err(e) => eprintln!("Parse error: {}", e),
        }
    }
}
