//! TypeScript language support via ast-grep-language.

pub use ast_grep_language::SupportLang;

/// The TypeScript language for ast-grep operations.
pub fn typescript() -> SupportLang {
    SupportLang::TypeScript
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast_grep_core::AstGrep;

    #[test]
    fn typescript_lang_parses() {
        let sg = AstGrep::new("const a = 1;", typescript());
        assert_eq!(sg.root().kind(), "program");
    }

    #[test]
    fn typescript_single_metavar() {
        let sg = AstGrep::new("foo(1); bar(2);", typescript());
        let root = sg.root();
        assert!(root.find("foo($ARG)").is_some());
        assert!(root.find("baz($ARG)").is_none());
    }
}
