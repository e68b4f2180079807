use rustc_hash::FxHashMap;

use crate::lexer::Token;

/// Object-like macro bindings. A name maps to at most one replacement token.
#[derive(Debug, Default, Clone)]
pub struct MacroTable {
    bindings: FxHashMap<String, Option<Token>>,
}

impl MacroTable {
    /// Binds `name`, replacing any earlier definition.
    pub fn define(&mut self, name: impl Into<String>, value: Option<Token>) {
        self.bindings.insert(name.into(), value);
    }

    pub fn undefine(&mut self, name: &str) -> bool {
        self.bindings.remove(name).is_some()
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// `None` if unbound, `Some(None)` if bound with an empty body.
    pub fn lookup(&self, name: &str) -> Option<Option<&Token>> {
        self.bindings.get(name).map(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Literal, TokenKind};

    fn int(value: i64) -> Token {
        Token::new(TokenKind::Literal(Literal::Int(value)), 1, 1)
    }

    #[test]
    fn last_definition_wins() {
        let mut table = MacroTable::default();
        table.define("N", Some(int(5)));
        table.define("N", Some(int(7)));
        assert_eq!(table.lookup("N"), Some(Some(&int(7))));
    }

    #[test]
    fn empty_binding_is_still_defined() {
        let mut table = MacroTable::default();
        table.define("FLAG", None);
        assert!(table.is_defined("FLAG"));
        assert_eq!(table.lookup("FLAG"), Some(None));
        assert_eq!(table.lookup("OTHER"), None);
    }

    #[test]
    fn undefine_removes_binding() {
        let mut table = MacroTable::default();
        table.define("X", Some(int(1)));
        assert!(table.undefine("X"));
        assert!(!table.undefine("X"));
        assert!(!table.is_defined("X"));
    }
}
