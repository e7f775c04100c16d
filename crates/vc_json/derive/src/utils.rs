use proc_macro2::TokenStream;

#[inline(always)]
pub(crate) fn empty() -> TokenStream {
    TokenStream::new()
}

/// `employee_no` -> `EmployeeNo`. A raw identifier prefix is dropped.
pub(crate) fn pascal_case(ident: &str) -> String {
    let ident = ident.strip_prefix("r#").unwrap_or(ident);
    let mut out = String::with_capacity(ident.len());

    for word in ident.split('_').filter(|w| !w.is_empty()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }

    if out.is_empty() {
        out.push_str(ident);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::pascal_case;

    #[test]
    fn field_names() {
        assert_eq!(pascal_case("employee_no"), "EmployeeNo");
        assert_eq!(pascal_case("name"), "Name");
        assert_eq!(pascal_case("r#type"), "Type");
        assert_eq!(pascal_case("__hidden_id"), "HiddenId");
        assert_eq!(pascal_case("url2_path"), "Url2Path");
        assert_eq!(pascal_case("_"), "_");
    }
}
