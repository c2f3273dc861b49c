//! Post-processing behaviour as seen through full renders.

mod common;

use eink_palette::Rgb;
use landscape_ink::error::{PipelineError, PostProcessError};
use landscape_ink::rendering::postprocess::{eink_flip, invert};
use landscape_ink::rendering::{Canvas, PixelMode, PostProcessor};
use landscape_ink::services::{HorizonArtist, RenderPipeline};
use pretty_assertions::assert_eq;

use common::{fixtures, FixedWeather};

fn render(variant: &str) -> Canvas {
    let tmp = tempfile::tempdir().unwrap();
    let config = fixtures::resolved(variant, tmp.path());
    RenderPipeline::new(FixedWeather::sample(), HorizonArtist)
        .render(&config)
        .unwrap()
}

#[test]
fn test_eink_variant_is_complement_of_bw() {
    let bw = render("bw");
    let eink = render("eink");
    common::assert_mono(&bw);
    common::assert_mono(&eink);
    common::assert_complement(&bw, &eink);
}

#[test]
fn test_inverted_variant_matches_eink_on_mono() {
    assert_eq!(render("bwi"), render("eink"));
}

#[test]
fn test_three_color_variant_only_uses_three_colors() {
    let canvas = render("bwr");
    assert_eq!(canvas.mode(), PixelMode::Rgb);
    common::assert_colors_within(&canvas, &[Rgb::BLACK, Rgb::WHITE, Rgb::RED]);

    let again = PostProcessor {
        three_color: true,
        ..Default::default()
    }
    .apply(canvas.clone())
    .unwrap();
    assert_eq!(again, canvas);
}

#[test]
fn test_rgb_variants_keep_palette_colors() {
    let canvas = render("rgb-white");
    assert_eq!(canvas.mode(), PixelMode::Rgb);
    // soil color appears below the ground line
    let soil = Rgb::new(148, 82, 1);
    let found = (0..canvas.height())
        .flat_map(|y| (0..canvas.width()).map(move |x| (x, y)))
        .any(|(x, y)| canvas.get(x, y) == soil);
    assert!(found, "soil color missing from rgb render");
}

#[test]
fn test_order_counter_example() {
    let grey = Rgb::new(90, 90, 90);
    let canvas = Canvas::new(PixelMode::Rgb, 2, 2, grey);

    let processor = PostProcessor {
        invert: true,
        eink_flip: true,
        three_color: false,
    };
    let fixed_order = processor.apply(canvas.clone()).unwrap();

    let mut reversed = canvas;
    eink_flip(&mut reversed);
    invert(&mut reversed);

    assert_eq!(fixed_order.get(0, 0), Rgb::WHITE);
    assert_eq!(reversed.get(0, 0), Rgb::BLACK);
}

#[test]
fn test_three_color_on_mono_preset_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = fixtures::resolved("bw", tmp.path());
    // bypasses resolution, which would already reject this
    config.three_color = true;

    let result = RenderPipeline::new(FixedWeather::sample(), HorizonArtist).render(&config);
    assert!(matches!(
        result,
        Err(PipelineError::Config(_)) | Err(PipelineError::PostProcess(PostProcessError::ThreeColorOnMono))
    ));

    let direct = PostProcessor {
        three_color: true,
        ..Default::default()
    }
    .apply(Canvas::new(PixelMode::Mono, 4, 4, Rgb::WHITE));
    assert!(matches!(direct, Err(PostProcessError::ThreeColorOnMono)));
}
