use super::*;

#[test]
fn kebab_and_dataset_keys_address_the_same_entry() {
    let data = ElementData::new().with("data-loader-type", "check");
    assert_eq!(data.get("loaderType"), Some("check"));
    assert_eq!(data.loader_kind(), Some(IndicatorKind::Check));
}

#[test]
fn empty_override_values_are_treated_as_absent() {
    let data = ElementData::from_pairs([("loaderText", ""), ("loaderType", "")]);
    assert_eq!(data.loader_text(), None);
    assert_eq!(data.loader_kind(), None);
}

#[test]
fn unknown_loader_type_selects_loading() {
    assert_eq!(IndicatorKind::from_attr("spinner"), IndicatorKind::Loading);
    assert_eq!(IndicatorKind::from_attr("CHECK"), IndicatorKind::Check);
}

#[test]
fn only_off_and_ajax_suppress_triggers() {
    assert_eq!(ElementData::new().marker(), LoaderMarker::Auto);
    assert!(ElementData::new().with("loader", "off").marker().suppresses_trigger());
    assert!(ElementData::new().with("data-loader", "ajax").marker().suppresses_trigger());
    assert!(!ElementData::new().with("loader", "on").marker().suppresses_trigger());
}

#[test]
fn check_falls_back_to_default_animation_without_success_asset() {
    let host = ElementData::new().with("data-animation", "/static/loader.json");
    let mount = MountConfig::from_element(&host);
    assert_eq!(
        mount.animation_for(IndicatorKind::Check),
        Some("/static/loader.json")
    );

    let mount = MountConfig::from_element(
        &host.with("data-success-animation", "/static/check.json"),
    );
    assert_eq!(
        mount.animation_for(IndicatorKind::Check),
        Some("/static/check.json")
    );
    assert_eq!(
        mount.animation_for(IndicatorKind::Loading),
        Some("/static/loader.json")
    );
}

#[test]
fn only_a_configured_success_animation_plays_once() {
    let fallback = MountConfig {
        default_animation: Some("/static/loader.json".into()),
        success_animation: None,
    };
    assert!(fallback.loops_for(IndicatorKind::Check));

    let with_success = MountConfig {
        success_animation: Some("/static/check.json".into()),
        ..fallback
    };
    assert!(!with_success.loops_for(IndicatorKind::Check));
    assert!(with_success.loops_for(IndicatorKind::Loading));
}
