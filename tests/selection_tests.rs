mod support;

use magnetic_label::layers::{LayerKind, compose_layers};
use magnetic_label::params::{IconType, LabelSpec, RenderMode};
use magnetic_label::selection::{PreviewPalette, select_renderables};
use std::collections::BTreeSet;

fn spec_with_icon() -> LabelSpec {
    LabelSpec {
        use_icon: true,
        icon_type: IconType::Text,
        icon_text: "@".to_string(),
        preview_color1: "Navy".to_string(),
        preview_color2: "Yellow".to_string(),
        ..LabelSpec::default()
    }
}

fn selected(spec: &LabelSpec, mode: RenderMode) -> Vec<LayerKind> {
    let layers = compose_layers(spec).unwrap();
    let palette = PreviewPalette::from_spec(spec);
    select_renderables(&layers, mode, &palette)
        .iter()
        .map(|r| r.layer.kind)
        .collect()
}

#[test]
fn color_modes_partition_the_layers() {
    let spec = spec_with_icon();
    let all: BTreeSet<LayerKind> = selected(&spec, RenderMode::All).into_iter().collect();
    let color1: BTreeSet<LayerKind> = selected(&spec, RenderMode::Color1).into_iter().collect();
    let color2: BTreeSet<LayerKind> = selected(&spec, RenderMode::Color2).into_iter().collect();

    assert!(color1.is_disjoint(&color2));
    assert_eq!(&color1 | &color2, all);
    assert_eq!(all.len(), 5);
}

#[test]
fn color1_without_icon() {
    let kinds = selected(&LabelSpec::default(), RenderMode::Color1);
    assert_eq!(kinds, vec![LayerKind::BasePlate, LayerKind::Frame, LayerKind::Text]);
}

#[test]
fn color2_is_the_inlay() {
    assert_eq!(selected(&spec_with_icon(), RenderMode::Color2), vec![LayerKind::Inlay]);
}

#[test]
fn preview_tags_every_layer_with_its_group_color() {
    let spec = spec_with_icon();
    let layers = compose_layers(&spec).unwrap();
    let palette = PreviewPalette::from_spec(&spec);

    let all = select_renderables(&layers, RenderMode::All, &palette);
    assert_eq!(all.len(), layers.len());
    for r in &all {
        let expected = if r.layer.kind == LayerKind::Inlay { "Yellow" } else { "Navy" };
        assert_eq!(r.color, Some(expected), "{}", r.layer.kind);
    }

    for mode in [RenderMode::Color1, RenderMode::Color2] {
        assert!(select_renderables(&layers, mode, &palette).iter().all(|r| r.color.is_none()));
    }
}

#[test]
fn selection_keeps_stacking_order() {
    let kinds = selected(&spec_with_icon(), RenderMode::All);
    let mut sorted = kinds.clone();
    sorted.sort();
    assert_eq!(kinds, sorted);
}
