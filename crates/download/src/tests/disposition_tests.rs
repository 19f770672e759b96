use super::*;

#[test]
fn prefers_extended_utf8_form() {
    let header = "attachment; filename=\"pagare.pdf\"; filename*=UTF-8''pagar%C3%A9%20firmado.pdf";
    assert_eq!(
        filename_from_disposition(Some(header)).as_deref(),
        Some("pagaré firmado.pdf")
    );
}

#[test]
fn falls_back_to_quoted_then_bare_form() {
    assert_eq!(
        filename_from_disposition(Some("attachment; filename=\"documentos_credito_7.zip\""))
            .as_deref(),
        Some("documentos_credito_7.zip")
    );
    assert_eq!(
        filename_from_disposition(Some("attachment; FILENAME= extracto.csv ; size=10")).as_deref(),
        Some("extracto.csv")
    );
}

#[test]
fn parameter_names_are_case_insensitive() {
    assert_eq!(
        filename_from_disposition(Some("attachment; FileName*=utf-8''r%C3%A9sum%C3%A9.txt"))
            .as_deref(),
        Some("résumé.txt")
    );
}

#[test]
fn missing_or_empty_names_yield_none() {
    assert_eq!(filename_from_disposition(None), None);
    assert_eq!(filename_from_disposition(Some("inline")), None);
    assert_eq!(filename_from_disposition(Some("attachment; filename=")), None);
    assert_eq!(filename_from_disposition(Some("attachment; filename=  ;")), None);
}

#[test]
fn invalid_utf8_in_extended_form_falls_through() {
    let header = "attachment; filename*=UTF-8''%FF%FE.bin; filename=\"plan.bin\"";
    assert_eq!(
        filename_from_disposition(Some(header)).as_deref(),
        Some("plan.bin")
    );
}

#[test]
fn sanitize_keeps_only_last_component() {
    assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
    assert_eq!(sanitize_filename("C:\\tmp\\extracto.pdf"), "extracto.pdf");
    assert_eq!(sanitize_filename(".."), FALLBACK_FILENAME);
    assert_eq!(sanitize_filename("  "), FALLBACK_FILENAME);
    assert_eq!(sanitize_filename("re\u{7}cibo.pdf"), "recibo.pdf");
}
