use fcdesign::rendering::asset::draw_asset;
use fcdesign::rendering::color::Rgba;
use fcdesign::rendering::factory::{AssetFactory, BoxStyle};
use fcdesign::rendering::geometry::{Padding, Size};
use fcdesign::rendering::pixmap::Pixmap;
use fcdesign::rendering::text::{FontSpec, HeadlessRasterizer, TextRasterizer, TextStyle};

fn style(size: f32) -> TextStyle {
    TextStyle::new(FontSpec::new("sans-serif", 700, size), Rgba::WHITE)
}

fn close(a: Size, b: Size) -> bool {
    (a.w - b.w).abs() < 1e-3 && (a.h - b.h).abs() < 1e-3
}

#[test]
fn single_child_composites_keep_size() {
    let r = HeadlessRasterizer::new();
    let mut f = AssetFactory::new(400, 200, &r).unwrap();
    let a = f.text("FREE", &style(24.0)).unwrap();
    let size = a.size();
    let row = f.row(vec![a.clone()], 10.0).unwrap();
    let col = f.col(vec![a], 10.0).unwrap();
    assert!(close(row.size(), size));
    assert!(close(col.size(), size));
}

#[test]
fn row_and_col_size_laws() {
    let r = HeadlessRasterizer::new();
    let mut f = AssetFactory::new(600, 400, &r).unwrap();
    let a = f.text("TESTING", &style(20.0)).unwrap();
    let b = f.text("53", &style(40.0)).unwrap();
    let (sa, sb) = (a.size(), b.size());

    let row = f.row(vec![a.clone(), b.clone()], 7.0).unwrap();
    assert!(close(row.size(), Size::new(sa.w + sb.w + 7.0, sa.h.max(sb.h))));

    let col = f.col(vec![a, b], 7.0).unwrap();
    assert!(close(col.size(), Size::new(sa.w.max(sb.w), sa.h + sb.h + 7.0)));
}

#[test]
fn column_of_three_texts_with_gap() {
    let r = HeadlessRasterizer::new();
    let mut f = AssetFactory::new(800, 400, &r).unwrap();
    let lines = [("BEGINNER", 20.0), ("FREE CONTEST", 20.0), ("52", 60.0)];
    let measured: f32 = lines
        .iter()
        .map(|(s, size)| r.measure(s, &style(*size).font).unwrap().height())
        .sum();
    let texts = lines
        .iter()
        .map(|(s, size)| f.text(s, &style(*size)))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let col = f.col(texts, 16.0).unwrap();
    assert!((col.height() - (measured + 2.0 * 16.0)).abs() < 0.5, "{}", col.height());
}

#[test]
fn identity_box_keeps_content_size() {
    let r = HeadlessRasterizer::new();
    let mut f = AssetFactory::new(400, 200, &r).unwrap();
    let content = f.text("CUP", &style(30.0)).unwrap();
    let size = content.size();
    let b = f.boxed(content, BoxStyle::new(Rgba::BLACK)).unwrap();
    assert!(close(b.size(), size));
}

#[test]
fn min_height_is_a_floor_not_a_ceiling() {
    let r = HeadlessRasterizer::new();
    let mut f = AssetFactory::new(400, 200, &r).unwrap();
    let pad = Padding::new(4.0, 8.0, 0.0, 8.0);

    let content = f.text("ROUND", &style(20.0)).unwrap();
    let natural = f.boxed(content.clone(), BoxStyle::new(Rgba::BLACK).padding(pad)).unwrap();
    let floored = f.boxed(content.clone(), BoxStyle::new(Rgba::BLACK).padding(pad).min_height(10.0)).unwrap();
    assert!(close(floored.size(), natural.size()));

    let tall = f.boxed(content, BoxStyle::new(Rgba::BLACK).padding(pad).min_height(50.0)).unwrap();
    assert!(close(tall.size(), Size::new(natural.width(), 50.0)));
}

#[test]
fn assets_draw_relative_to_frame_corner() {
    let r = HeadlessRasterizer::new();
    let mut f = AssetFactory::new(100, 100, &r).unwrap();
    let a = f.text("A", &style(20.0)).unwrap();
    assert!(close(a.size(), Size::new(10.0, 20.0)));

    let mut out = Pixmap::new(40, 40).unwrap();
    draw_asset(&mut out, &a, 0.0, 0.0);
    // glyph block spans rows 2..16 of the 20-unit font box
    assert_eq!(out.pixel(5, 1), Some(Rgba::TRANSPARENT));
    assert_eq!(out.pixel(5, 2), Some(Rgba::WHITE));
    assert_eq!(out.pixel(5, 15), Some(Rgba::WHITE));
    assert_eq!(out.pixel(5, 16), Some(Rgba::TRANSPARENT));
    assert_eq!(out.pixel(10, 8), Some(Rgba::TRANSPARENT));
}

#[test]
fn spacers_separate_boxes_in_a_row() {
    let r = HeadlessRasterizer::new();
    let mut f = AssetFactory::new(200, 200, &r).unwrap();
    let left = f.boxed(f.space(10.0, 10.0), BoxStyle::new(Rgba::WHITE)).unwrap();
    let right = f.boxed(f.space(10.0, 10.0), BoxStyle::new(Rgba::BLACK)).unwrap();
    let gap = f.hspace(6.0);
    let row = f.row(vec![left, gap, right], 0.0).unwrap();
    assert!(close(row.size(), Size::new(26.0, 10.0)));

    let mut out = Pixmap::new(40, 20).unwrap();
    draw_asset(&mut out, &row, 2.0, 3.0);
    assert_eq!(out.pixel(2, 3), Some(Rgba::WHITE));
    assert_eq!(out.pixel(13, 3), Some(Rgba::TRANSPARENT));
    assert_eq!(out.pixel(19, 12), Some(Rgba::BLACK));
    assert_eq!(out.pixel(28, 12), Some(Rgba::TRANSPARENT));
}

#[test]
fn negative_sizes_clamp_to_zero() {
    let r = HeadlessRasterizer::new();
    let mut f = AssetFactory::new(200, 200, &r).unwrap();

    let row = f.row(vec![f.space(-10.0, 5.0), f.space(4.0, -3.0)], 0.0).unwrap();
    assert_eq!(row.size(), Size::new(0.0, 5.0));

    let col = f.col(vec![f.space(-2.0, -2.0), f.space(-2.0, -2.0)], -5.0).unwrap();
    assert_eq!(col.size(), Size::ZERO);
    assert!(col.bitmap.is_none());

    let inverted = BoxStyle::new(Rgba::WHITE).padding(Padding::uniform(-3.0)).min_height(-5.0);
    let b = f.boxed(f.space(-10.0, -10.0), inverted).unwrap();
    assert_eq!(b.size(), Size::ZERO);
    assert!(b.bitmap.is_none());

    let shrunk = BoxStyle::new(Rgba::WHITE).padding(Padding::uniform(-2.0)).min_height(-1.0);
    let b = f.boxed(f.space(20.0, 10.0), shrunk).unwrap();
    assert_eq!(b.size(), Size::new(16.0, 6.0));

    // Degenerate assets compose and draw like any other.
    let mixed = f.row(vec![row, col, b], 1.0).unwrap();
    assert_eq!(mixed.size(), Size::new(18.0, 6.0));
    let mut out = Pixmap::new(40, 40).unwrap();
    draw_asset(&mut out, &mixed, 5.0, 5.0);
}
