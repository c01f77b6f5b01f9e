//! Cover example - renders the default cover and writes it next to the crate

use fcdesign::rendering::text::HeadlessRasterizer;
use fcdesign::scene::{self, parse_source, CoverInputs, CoverScene};
use fcdesign::RenderConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("fcdesign - Cover Example\n");

    let inputs = CoverInputs {
        source: "CÁC KỲ THI,09/2023\n02/09,BEGINNER CONTEST,12\n16/09,FREE CONTEST,150".to_string(),
    };
    let parsed = parse_source(&inputs.source);
    println!("Title: {} {}", parsed.title.top, parsed.title.main);
    for item in &parsed.items {
        println!("  {} | {} | {}", item.top, item.main, item.right);
    }

    // S=2 keeps the example quick; the scene's own factor is 8
    let config = RenderConfig { supersample: Some(2), ..Default::default() };
    let shot = scene::render(&CoverScene::new(inputs), &HeadlessRasterizer::new(), &config)?;
    std::fs::write("cover_demo.png", shot.to_png()?)?;
    println!("\nWrote cover_demo.png ({}x{}), sha256 {}", shot.width, shot.height, shot.digest());
    Ok(())
}
