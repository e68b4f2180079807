//! Declarations, declarators and function definitions.

use super::ast::*;
use super::Parser;
use crate::lexer::{Keyword, Punctuator, Token, TokenKind};
use crate::CompileError;

/// Which declaration-specifier class a token belongs to, if any.
pub(super) fn classify(token: &Token) -> Option<DeclarationSpecifier> {
    let TokenKind::Keyword(kw) = token.kind else {
        return None;
    };

    let specifier = match kw {
        Keyword::Typedef => DeclarationSpecifier::StorageClass(StorageClass::Typedef),
        Keyword::Extern => DeclarationSpecifier::StorageClass(StorageClass::Extern),
        Keyword::Static => DeclarationSpecifier::StorageClass(StorageClass::Static),
        Keyword::Auto => DeclarationSpecifier::StorageClass(StorageClass::Auto),
        Keyword::Register => DeclarationSpecifier::StorageClass(StorageClass::Register),
        Keyword::Inline => DeclarationSpecifier::StorageClass(StorageClass::Inline),
        Keyword::Void => DeclarationSpecifier::Type(TypeSpecifier::Void),
        Keyword::Char => DeclarationSpecifier::Type(TypeSpecifier::Char),
        Keyword::Short => DeclarationSpecifier::Type(TypeSpecifier::Short),
        Keyword::Int => DeclarationSpecifier::Type(TypeSpecifier::Int),
        Keyword::Long => DeclarationSpecifier::Type(TypeSpecifier::Long),
        Keyword::Float => DeclarationSpecifier::Type(TypeSpecifier::Float),
        Keyword::Double => DeclarationSpecifier::Type(TypeSpecifier::Double),
        Keyword::Signed => DeclarationSpecifier::Type(TypeSpecifier::Signed),
        Keyword::Unsigned => DeclarationSpecifier::Type(TypeSpecifier::Unsigned),
        Keyword::Bool => DeclarationSpecifier::Type(TypeSpecifier::Bool),
        // Placeholders; the real specifier needs the tokens that follow.
        Keyword::Struct => DeclarationSpecifier::Type(TypeSpecifier::Struct(RecordSpecifier {
            tag: None,
            members: None,
        })),
        Keyword::Union => DeclarationSpecifier::Type(TypeSpecifier::Union(RecordSpecifier {
            tag: None,
            members: None,
        })),
        Keyword::Enum => DeclarationSpecifier::Type(TypeSpecifier::Enum(EnumSpecifier {
            tag: None,
            enumerators: None,
        })),
        Keyword::Const => DeclarationSpecifier::Qualifier(TypeQualifier::Const),
        Keyword::Restrict => DeclarationSpecifier::Qualifier(TypeQualifier::Restrict),
        Keyword::Volatile => DeclarationSpecifier::Qualifier(TypeQualifier::Volatile),
        _ => return None,
    };
    Some(specifier)
}

fn qualifier(token: &Token) -> Option<TypeQualifier> {
    match classify(token)? {
        DeclarationSpecifier::Qualifier(qualifier) => Some(qualifier),
        _ => None,
    }
}

impl<'a> Parser<'a> {
    pub(super) fn at_declaration_start(&self) -> bool {
        self.peek().and_then(classify).is_some()
    }

    pub(super) fn parse_external_declaration(&mut self) -> Result<ExternalDeclaration, CompileError> {
        let specifiers = self.parse_declaration_specifiers()?;
        if self.eat_punct(Punctuator::Semicolon) {
            return Ok(ExternalDeclaration::Declaration(Declaration {
                specifiers,
                declarators: Vec::new(),
            }));
        }

        let declarator = self.parse_declarator(false)?;

        if self.at_punct(Punctuator::OpenBrace) {
            if declarator.parameters().is_none() {
                return Err(self.error("expected ';' after declarator"));
            }
            let body = self.parse_compound_statement()?;
            return Ok(ExternalDeclaration::Function(FunctionDefinition {
                specifiers,
                declarator,
                body,
            }));
        }

        let declarators = self.parse_init_declarators(declarator)?;
        Ok(ExternalDeclaration::Declaration(Declaration {
            specifiers,
            declarators,
        }))
    }

    /// `specifiers init-declarator-list? ;` inside a block.
    pub(super) fn parse_declaration(&mut self) -> Result<Declaration, CompileError> {
        let specifiers = self.parse_declaration_specifiers()?;
        if self.eat_punct(Punctuator::Semicolon) {
            return Ok(Declaration {
                specifiers,
                declarators: Vec::new(),
            });
        }

        let first = self.parse_declarator(false)?;
        let declarators = self.parse_init_declarators(first)?;
        Ok(Declaration {
            specifiers,
            declarators,
        })
    }

    /// Finishes an init-declarator list whose first declarator is parsed,
    /// through the closing `;`.
    fn parse_init_declarators(&mut self, first: Declarator) -> Result<Vec<InitDeclarator>, CompileError> {
        let mut declarators = Vec::new();
        let mut declarator = first;
        loop {
            let initializer = if self.eat_punct(Punctuator::Assign) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarators.push(InitDeclarator {
                declarator,
                initializer,
            });

            if !self.eat_punct(Punctuator::Comma) {
                break;
            }
            declarator = self.parse_declarator(false)?;
        }
        self.expect_punct(Punctuator::Semicolon)?;
        Ok(declarators)
    }

    pub(super) fn parse_declaration_specifiers(&mut self) -> Result<Vec<DeclarationSpecifier>, CompileError> {
        let mut specifiers = Vec::new();
        while let Some(specifier) = self.peek().and_then(classify) {
            self.pos += 1;
            let specifier = match specifier {
                DeclarationSpecifier::Type(TypeSpecifier::Struct(_)) => {
                    DeclarationSpecifier::Type(TypeSpecifier::Struct(self.parse_record_specifier("struct")?))
                }
                DeclarationSpecifier::Type(TypeSpecifier::Union(_)) => {
                    DeclarationSpecifier::Type(TypeSpecifier::Union(self.parse_record_specifier("union")?))
                }
                DeclarationSpecifier::Type(TypeSpecifier::Enum(_)) => {
                    DeclarationSpecifier::Type(TypeSpecifier::Enum(self.parse_enum_specifier()?))
                }
                other => other,
            };
            specifiers.push(specifier);
        }

        if specifiers.is_empty() {
            return Err(self.error("expected declaration specifiers"));
        }
        Ok(specifiers)
    }

    fn parse_record_specifier(&mut self, keyword: &str) -> Result<RecordSpecifier, CompileError> {
        let tag = self.eat_identifier();
        if !self.eat_punct(Punctuator::OpenBrace) {
            if tag.is_none() {
                return Err(self.error(format!("expected identifier or '{{' after '{keyword}'")));
            }
            return Ok(RecordSpecifier { tag, members: None });
        }

        let mut members = Vec::new();
        while !self.eat_punct(Punctuator::CloseBrace) {
            members.push(self.parse_declaration()?);
        }
        Ok(RecordSpecifier {
            tag,
            members: Some(members),
        })
    }

    fn parse_enum_specifier(&mut self) -> Result<EnumSpecifier, CompileError> {
        let tag = self.eat_identifier();
        if !self.eat_punct(Punctuator::OpenBrace) {
            if tag.is_none() {
                return Err(self.error("expected identifier or '{' after 'enum'"));
            }
            return Ok(EnumSpecifier {
                tag,
                enumerators: None,
            });
        }

        let mut enumerators = Vec::new();
        while !self.eat_punct(Punctuator::CloseBrace) {
            let name = self.expect_identifier()?;
            let value = if self.eat_punct(Punctuator::Assign) {
                Some(self.parse_conditional()?)
            } else {
                None
            };
            enumerators.push(Enumerator { name, value });

            if !self.eat_punct(Punctuator::Comma) {
                self.expect_punct(Punctuator::CloseBrace)?;
                break;
            }
        }
        Ok(EnumSpecifier {
            tag,
            enumerators: Some(enumerators),
        })
    }

    fn parse_pointers(&mut self) -> Vec<Vec<TypeQualifier>> {
        let mut pointers = Vec::new();
        while self.eat_punct(Punctuator::Star) {
            let mut qualifiers = Vec::new();
            while let Some(q) = self.peek().and_then(qualifier) {
                self.pos += 1;
                qualifiers.push(q);
            }
            pointers.push(qualifiers);
        }
        pointers
    }

    /// Parses a declarator. With `abstract_ok` the identifier may be omitted,
    /// as in parameter declarations like `int *` or `char (*)(void)`.
    pub(super) fn parse_declarator(&mut self, abstract_ok: bool) -> Result<Declarator, CompileError> {
        let pointers = self.parse_pointers();

        let base = if let Some(name) = self.eat_identifier() {
            DeclaratorBase::Identifier(name)
        } else if self.at_punct(Punctuator::OpenParen) && (!abstract_ok || self.nested_declarator_follows()) {
            self.pos += 1;
            let inner = self.parse_declarator(abstract_ok)?;
            self.expect_punct(Punctuator::CloseParen)?;
            DeclaratorBase::Nested(Box::new(inner))
        } else if abstract_ok {
            DeclaratorBase::Abstract
        } else {
            return Err(self.error("expected identifier or '('"));
        };

        let mut suffixes = Vec::new();
        loop {
            if self.eat_punct(Punctuator::OpenBracket) {
                let size = if self.at_punct(Punctuator::CloseBracket) {
                    None
                } else {
                    Some(self.parse_conditional()?)
                };
                self.expect_punct(Punctuator::CloseBracket)?;
                suffixes.push(DeclaratorSuffix::Array(size));
            } else if self.eat_punct(Punctuator::OpenParen) {
                suffixes.push(DeclaratorSuffix::Function(self.parse_parameter_list()?));
            } else {
                break;
            }
        }

        Ok(Declarator {
            pointers,
            direct: DirectDeclarator { base, suffixes },
        })
    }

    /// In an abstract context, does the `(` at the cursor open a nested
    /// declarator rather than a parameter list?
    fn nested_declarator_follows(&self) -> bool {
        matches!(
            self.peek_nth(1).map(|t| &t.kind),
            Some(
                TokenKind::Punctuator(Punctuator::Star | Punctuator::OpenParen | Punctuator::OpenBracket)
                    | TokenKind::Identifier(_)
            )
        )
    }

    /// Parameters after the opening `(`, through the closing `)`.
    fn parse_parameter_list(&mut self) -> Result<ParameterList, CompileError> {
        let mut list = ParameterList::default();
        if self.eat_punct(Punctuator::CloseParen) {
            return Ok(list);
        }

        loop {
            if self.eat_punct(Punctuator::Ellipsis) {
                list.variadic = true;
                break;
            }

            let specifiers = self.parse_declaration_specifiers()?;
            let declarator = if self.at_punct(Punctuator::Comma) || self.at_punct(Punctuator::CloseParen) {
                None
            } else {
                Some(self.parse_declarator(true)?)
            };
            list.params.push(ParameterDeclaration {
                specifiers,
                declarator,
            });

            if !self.eat_punct(Punctuator::Comma) {
                break;
            }
        }

        self.expect_punct(Punctuator::CloseParen)?;
        Ok(list)
    }

    /// `specifiers "*"*` as used by `sizeof ( type-name )`.
    pub(super) fn parse_type_name(&mut self) -> Result<SizeofOperand, CompileError> {
        let specifiers = self.parse_declaration_specifiers()?;
        let pointers = self.parse_pointers().len();
        Ok(SizeofOperand::Type {
            specifiers,
            pointers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{body, parse_err, parse_source};
    use super::*;

    fn only_declaration(source: &str) -> Declaration {
        let unit = parse_source(source);
        match unit.items.as_slice() {
            [ExternalDeclaration::Declaration(decl)] => decl.clone(),
            other => panic!("expected a single declaration, got {other:?}"),
        }
    }

    #[test]
    fn global_with_initializer() {
        let decl = only_declaration("static const int x = 5, y;");
        assert_eq!(
            decl.specifiers,
            vec![
                DeclarationSpecifier::StorageClass(StorageClass::Static),
                DeclarationSpecifier::Qualifier(TypeQualifier::Const),
                DeclarationSpecifier::Type(TypeSpecifier::Int),
            ]
        );
        assert_eq!(decl.declarators.len(), 2);
        assert_eq!(decl.declarators[0].declarator.name(), Some("x"));
        assert_eq!(decl.declarators[0].initializer, Some(Expr::int(5)));
        assert_eq!(decl.declarators[1].declarator.name(), Some("y"));
        assert_eq!(decl.declarators[1].initializer, None);
    }

    #[test]
    fn function_prototype() {
        let decl = only_declaration("int add(int a, int b);");
        let declarator = &decl.declarators[0].declarator;
        assert_eq!(declarator.name(), Some("add"));

        let params = declarator.parameters().unwrap();
        assert_eq!(params.params.len(), 2);
        assert!(!params.variadic);
        let names: Vec<_> = params
            .params
            .iter()
            .map(|p| p.declarator.as_ref().and_then(|d| d.name()))
            .collect();
        assert_eq!(names, vec![Some("a"), Some("b")]);
    }

    #[test]
    fn void_parameter_list() {
        let decl = only_declaration("int f(void);");
        let params = decl.declarators[0].declarator.parameters().unwrap();
        assert_eq!(
            params.params,
            vec![ParameterDeclaration {
                specifiers: vec![DeclarationSpecifier::Type(TypeSpecifier::Void)],
                declarator: None,
            }]
        );
        assert!(!params.variadic);
    }

    #[test]
    fn variadic_with_abstract_parameter() {
        let decl = only_declaration("int printf(const char *, ...);");
        let params = decl.declarators[0].declarator.parameters().unwrap();
        assert!(params.variadic);
        assert_eq!(params.params.len(), 1);

        let declarator = params.params[0].declarator.as_ref().unwrap();
        assert_eq!(declarator.pointers, vec![Vec::<TypeQualifier>::new()]);
        assert_eq!(declarator.direct.base, DeclaratorBase::Abstract);
    }

    #[test]
    fn pointer_and_array_declarators() {
        let decl = only_declaration("char * const *argv[4];");
        let declarator = &decl.declarators[0].declarator;
        assert_eq!(declarator.pointers, vec![vec![TypeQualifier::Const], vec![]]);
        assert_eq!(
            declarator.direct.suffixes,
            vec![DeclaratorSuffix::Array(Some(Expr::int(4)))]
        );
    }

    #[test]
    fn function_pointer_declarator() {
        let decl = only_declaration("int (*handler)(int);");
        let declarator = &decl.declarators[0].declarator;
        assert_eq!(declarator.name(), Some("handler"));
        assert!(matches!(declarator.direct.base, DeclaratorBase::Nested(_)));
        assert!(declarator.parameters().is_some());
    }

    #[test]
    fn struct_and_enum_specifiers() {
        let decl = only_declaration("struct point { int x; int y; };");
        let [DeclarationSpecifier::Type(TypeSpecifier::Struct(record))] = decl.specifiers.as_slice() else {
            panic!("expected struct specifier, got {:?}", decl.specifiers);
        };
        assert_eq!(record.tag.as_deref(), Some("point"));
        assert_eq!(record.members.as_ref().map(Vec::len), Some(2));

        let decl = only_declaration("enum color { RED, GREEN = 4, BLUE, } c;");
        let [DeclarationSpecifier::Type(TypeSpecifier::Enum(spec))] = decl.specifiers.as_slice() else {
            panic!("expected enum specifier, got {:?}", decl.specifiers);
        };
        let enumerators = spec.enumerators.as_ref().unwrap();
        assert_eq!(enumerators.len(), 3);
        assert_eq!(enumerators[1].value, Some(Expr::int(4)));
        assert_eq!(decl.declarators[0].declarator.name(), Some("c"));
    }

    #[test]
    fn struct_reference_without_body() {
        let decl = only_declaration("struct node *head;");
        assert!(matches!(
            decl.specifiers.as_slice(),
            [DeclarationSpecifier::Type(TypeSpecifier::Struct(RecordSpecifier { members: None, .. }))]
        ));
    }

    #[test]
    fn anonymous_struct_requires_body() {
        let err = parse_err("struct;");
        assert!(err.to_string().contains("expected identifier or '{' after 'struct'"));
    }

    #[test]
    fn local_declarations_in_body() {
        let items = body("int main() { int a = 1; unsigned long b; return 0; }");
        assert!(matches!(items[0], BlockItem::Declaration(_)));
        assert!(matches!(items[1], BlockItem::Declaration(_)));
        assert!(matches!(items[2], BlockItem::Statement(Statement::Return(_))));
    }

    #[test]
    fn typedef_name_does_not_start_declaration() {
        // `myint` is not known to be a type, so this is read as an expression.
        let err = parse_err("typedef int myint; int main() { myint x; return 0; }");
        assert!(err.to_string().contains("expected ';', found `x`"));
    }

    #[test]
    fn body_requires_function_declarator() {
        let err = parse_err("int x { return 0; }");
        assert!(err.to_string().contains("expected ';' after declarator"));
    }
}
