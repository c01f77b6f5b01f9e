//! Post example - renders every theme through the async session

use std::sync::Arc;

use fcdesign::platform::FontsReady;
use fcdesign::rendering::text::HeadlessRasterizer;
use fcdesign::scene::{PostInputs, PostScene, Theme};
use fcdesign::{RenderConfig, RenderOutcome, RenderSession};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("fcdesign - Post Example\n");

    let config = RenderConfig { supersample: Some(1), debounce_ms: 0, ..Default::default() };
    let session = RenderSession::new(FontsReady::ready(Arc::new(HeadlessRasterizer::new())), config);

    for theme in [Theme::Blue, Theme::Green, Theme::Orange, Theme::Yellow] {
        let inputs = PostInputs { theme, zoom: 0.2, ..Default::default() };
        match session.render(Arc::new(PostScene::new(inputs))).await? {
            RenderOutcome::Presented(shot) => {
                let path = format!("post_{}.png", theme);
                std::fs::write(&path, shot.to_png()?)?;
                println!("{:<8} -> {} ({})", theme.name(), path, &shot.digest()[..16]);
            }
            RenderOutcome::Superseded => println!("{:<8} superseded", theme.name()),
        }
    }

    session.close().await?;
    Ok(())
}
