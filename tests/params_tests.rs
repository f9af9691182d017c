mod support;

use magnetic_label::errors::ConfigError;
use magnetic_label::float_types::Real;
use magnetic_label::params::{IconType, LabelSpec, MagnetLayout, RenderMode};
use support::approx_eq;

#[test]
fn derived_thicknesses_of_defaults() {
    let spec = LabelSpec::default();
    assert!(approx_eq(spec.base_thickness(), 3.6, 1e-12));
    assert!(approx_eq(spec.frame_thickness(), 1.4, 1e-12));
    assert!(approx_eq(spec.total_thickness(), 5.0, 1e-12));
    assert!(approx_eq(spec.cavity_diameter(), 6.2, 1e-12));
    assert!(approx_eq(spec.inner_width(), 56.0, 1e-12));
    assert!(approx_eq(spec.inner_height(), 21.0, 1e-12));
    assert!(approx_eq(spec.inner_radius(), 6.0, 1e-12));
    assert!(spec.validate().is_ok());
}

#[test]
fn inner_radius_never_negative() {
    let spec = LabelSpec {
        corner_radius: 1.0,
        border_width: 3.0,
        ..LabelSpec::default()
    };
    assert_eq!(spec.inner_radius(), 0.0);
}

#[test]
fn toml_overrides_only_given_fields() {
    let spec = LabelSpec::from_toml_str(
        r#"
        label_text = "PLA"
        magnet_count = 4
        render_mode = "color2"
        icon_type = "svg"
        "#,
    )
    .unwrap();
    assert_eq!(spec.label_text, "PLA");
    assert_eq!(spec.magnet_count, 4);
    assert_eq!(spec.render_mode, RenderMode::Color2);
    assert_eq!(spec.icon_type, IconType::Svg);
    assert_eq!(spec.label_width, LabelSpec::default().label_width);
    assert_eq!(spec.magnet_layout().unwrap(), MagnetLayout::Four);
}

#[test]
fn toml_rejects_unknown_render_mode() {
    assert!(LabelSpec::from_toml_str("render_mode = \"color3\"").is_err());
}

#[test]
fn toml_text_survives_serialization() {
    let spec = LabelSpec {
        label_text: "Ä \"quoted\"".to_string(),
        ..LabelSpec::default()
    };
    let text = spec.to_toml_string().unwrap();
    assert_eq!(LabelSpec::from_toml_str(&text).unwrap(), spec);
}

#[test]
fn render_mode_parsing() {
    assert_eq!("all".parse::<RenderMode>().unwrap(), RenderMode::All);
    assert_eq!(" Color1 ".parse::<RenderMode>().unwrap(), RenderMode::Color1);
    assert_eq!("color2".parse::<RenderMode>().unwrap(), RenderMode::Color2);
    assert_eq!(
        "colour1".parse::<RenderMode>(),
        Err(ConfigError::InvalidRenderMode("colour1".to_string()))
    );
    assert!("".parse::<RenderMode>().is_err());
}

#[test]
fn icon_type_parsing() {
    assert_eq!("SVG".parse::<IconType>().unwrap(), IconType::Svg);
    assert!(matches!("png".parse::<IconType>(), Err(ConfigError::InvalidIconType(_))));
}

#[test]
fn non_positive_dimensions_are_rejected() {
    let spec = LabelSpec {
        label_width: 0.0,
        ..LabelSpec::default()
    };
    assert!(matches!(
        spec.validate(),
        Err(ConfigError::NonPositive { field: "label_width", .. })
    ));

    let spec = LabelSpec {
        text_thickness: -0.2,
        ..LabelSpec::default()
    };
    assert!(matches!(
        spec.validate(),
        Err(ConfigError::NonPositive { field: "text_thickness", .. })
    ));

    let spec = LabelSpec {
        font_size: Real::NAN,
        ..LabelSpec::default()
    };
    assert!(spec.validate().is_err());
}

#[test]
fn border_must_leave_an_opening() {
    let spec = LabelSpec {
        border_width: 12.5,
        ..LabelSpec::default()
    };
    assert!(matches!(
        spec.validate(),
        Err(ConfigError::OutOfRange { field: "border_width", .. })
    ));
}

#[test]
fn magnet_count_must_be_two_or_four() {
    for count in [0, 1, 3, 5] {
        let spec = LabelSpec {
            magnet_count: count,
            ..LabelSpec::default()
        };
        assert_eq!(spec.validate(), Err(ConfigError::InvalidMagnetCount(count)));
    }
}

#[test]
fn magnet_too_close_to_edge() {
    let spec = LabelSpec {
        magnet_inset: 3.0,
        ..LabelSpec::default()
    };
    match spec.validate() {
        Err(ConfigError::MagnetOutsidePlate { clearance, .. }) => {
            assert!(approx_eq(clearance, 3.0 - 3.1, 1e-12));
        },
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn two_magnets_on_center_line_need_half_height() {
    // inset is fine, but a 5 mm tall label cannot hold a 6.2 mm cavity
    let spec = LabelSpec {
        label_height: 5.0,
        border_width: 1.0,
        corner_radius: 1.0,
        ..LabelSpec::default()
    };
    assert!(matches!(spec.validate(), Err(ConfigError::MagnetOutsidePlate { .. })));
}

#[test]
fn magnets_must_not_overlap() {
    let spec = LabelSpec {
        label_width: 24.0,
        ..LabelSpec::default()
    };
    match spec.validate() {
        Err(ConfigError::MagnetsOverlap { spacing, .. }) => assert!(approx_eq(spacing, 4.0, 1e-12)),
        other => panic!("unexpected {other:?}"),
    }

    // four magnets: the vertical spacing counts too
    let spec = LabelSpec {
        magnet_count: 4,
        label_height: 25.0,
        ..LabelSpec::default()
    };
    assert!(matches!(spec.validate(), Err(ConfigError::MagnetsOverlap { .. })));
    let spec = LabelSpec {
        magnet_count: 4,
        label_height: 30.0,
        ..LabelSpec::default()
    };
    assert!(spec.validate().is_ok());
}

#[test]
fn icon_needs_a_source() {
    let spec = LabelSpec {
        use_icon: true,
        icon_type: IconType::Svg,
        icon_svg: None,
        ..LabelSpec::default()
    };
    assert_eq!(spec.validate(), Err(ConfigError::MissingIconSource));

    let spec = LabelSpec {
        use_icon: true,
        icon_type: IconType::Text,
        icon_text: String::new(),
        ..LabelSpec::default()
    };
    assert_eq!(spec.validate(), Err(ConfigError::EmptyIconText));

    // an icon type without use_icon is ignored
    let spec = LabelSpec {
        use_icon: false,
        icon_type: IconType::Svg,
        ..LabelSpec::default()
    };
    assert!(spec.validate().is_ok());
}

#[test]
fn corner_magnets_must_clear_the_rounded_corner() {
    // inset 4 clears both straight edges but not the 8 mm corner arc
    let spec = LabelSpec {
        magnet_count: 4,
        magnet_inset: 4.0,
        ..LabelSpec::default()
    };
    match spec.validate() {
        Err(ConfigError::MagnetOutsidePlate { clearance, .. }) => assert!(clearance < -0.5),
        other => panic!("unexpected {other:?}"),
    }

    // the same cavities fit a sharp plate
    let sharp = LabelSpec {
        corner_radius: 0.0,
        ..spec.clone()
    };
    assert!(sharp.validate().is_ok());

    // and a corner small enough to stay clear of them
    let small = LabelSpec {
        corner_radius: 2.0,
        border_width: 1.0,
        ..spec
    };
    assert!(small.validate().is_ok());
}

#[test]
fn outer_radius_is_capped_by_the_short_side() {
    let spec = LabelSpec {
        corner_radius: 40.0,
        ..LabelSpec::default()
    };
    assert_eq!(spec.outer_radius(), 12.5);
    assert_eq!(LabelSpec::default().outer_radius(), 8.0);
}
