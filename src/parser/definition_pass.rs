//! Pass 1 of 2: scan top-level (depth-0) lines for definition signatures and
//! register them in the namespace, without parsing any function/test bodies
//! yet (§4.3 "the definition pass / body pass split"). Types referenced in
//! signatures that are not yet known become `Unknown` placeholders, resolved
//! later by the resolver's unknown-type pass (§9).

use crate::ast::{
    DataDef, Definition, EntityDef, EnumDef, ErrorSetDef, FunctionDef, ImportDef, Param, Span, TestDef,
    TypeAliasDef, VariantDef,
};
use crate::error::{ErrorKind, ProductionError};
use crate::matcher::get_leading_indents;
use crate::namespace::Namespace;
use crate::parser::patterns;
use crate::parser::type_parser::TypeParser;
use crate::token::{Token, TokenKind};

/// Where a parsed body eventually gets attached: either a top-level
/// `namespace.definitions` slot, or a function nested inside an entity's own
/// `functions` vector (§4.3: entity members are folded into the entity's
/// definition rather than registered as their own top-level definitions).
#[derive(Debug, Clone, Copy)]
pub enum BodyTarget {
    TopLevel(usize),
    EntityFunction { entity_index: usize, function_index: usize },
}

/// A definition whose signature has been registered but whose body (if any)
/// still needs parsing: the token range starting at `body_start` covers the
/// block that follows the header line. `depth` is the literal indentation
/// depth this pass actually observed on that block's first line — never a
/// fixed increment over the header's depth, since indentation here is a raw
/// leading-whitespace count rather than a nesting level (see
/// `DefinitionPass::block_depth`).
pub struct PendingBody {
    pub target: BodyTarget,
    pub body_start: usize,
    pub depth: usize,
}

pub struct DefinitionPass<'a, 'src> {
    tokens: &'a [Token<'src>],
    namespace: &'a mut Namespace,
}

impl<'a, 'src> DefinitionPass<'a, 'src> {
    pub fn new(tokens: &'a [Token<'src>], namespace: &'a mut Namespace) -> Self {
        Self { tokens, namespace }
    }

    pub fn run(&mut self) -> Result<Vec<PendingBody>, ProductionError> {
        let mut pending = Vec::new();
        let mut cursor = 0;
        while let Some((depth, body_start)) = get_leading_indents(self.tokens, cursor) {
            if depth != 0 {
                cursor = self.skip_line(cursor);
                continue;
            }
            cursor = self.parse_top_level(body_start, &mut pending)?;
        }
        Ok(pending)
    }

    fn skip_line(&self, mut index: usize) -> usize {
        while let Some(token) = self.tokens.get(index) {
            index += 1;
            if token.kind == TokenKind::Eol {
                break;
            }
        }
        index
    }

    /// Classify the header line at `start` by testing it against the
    /// signature patterns in [`patterns`] (§4.2's shared predicate engine),
    /// dispatching to whichever handler's pattern matches first — the same
    /// role `original_source`'s static pattern table plays in picking a
    /// production for a line before parsing it in detail.
    fn parse_top_level(&mut self, start: usize, pending: &mut Vec<PendingBody>) -> Result<usize, ProductionError> {
        let span = self.span(start);
        if patterns::use_statement().eval(self.tokens, start).is_some() {
            return self.parse_use(start, span);
        }
        if patterns::type_alias().eval(self.tokens, start).is_some() {
            return self.parse_type_alias(start, span);
        }
        if patterns::extern_function_declaration().eval(self.tokens, start).is_some() {
            return self.parse_function(start, true, span, pending);
        }
        if patterns::function_signature().eval(self.tokens, start).is_some() {
            return self.parse_function(start, false, span, pending);
        }
        if patterns::data_definition().eval(self.tokens, start).is_some() {
            return self.parse_data(start, span);
        }
        if patterns::enum_definition().eval(self.tokens, start).is_some() {
            return self.parse_enum(start, span);
        }
        if patterns::variant_definition().eval(self.tokens, start).is_some() {
            return self.parse_variant(start, span);
        }
        if patterns::error_definition().eval(self.tokens, start).is_some() {
            return self.parse_error_set(start, span);
        }
        if patterns::entity_definition().eval(self.tokens, start).is_some() {
            return self.parse_entity(start, span, pending);
        }
        if patterns::test_definition().eval(self.tokens, start).is_some() {
            return self.parse_test(start, span, pending);
        }
        Err(ProductionError::validation(
            ErrorKind::ErrParsing,
            format!("expected a top-level definition, found {:?}", self.tokens.get(start).map(|t| t.kind)),
        ))
    }

    fn parse_use(&mut self, start: usize, span: Span) -> Result<usize, ProductionError> {
        let path_token = self
            .tokens
            .get(start + 1)
            .filter(|t| t.kind == TokenKind::StrValue)
            .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a path string after `use`"))?;
        let path = path_token.lexeme.trim_matches('"').to_string();

        let mut cursor = start + 2;
        let alias = if self.tokens.get(cursor).map(|t| t.kind) == Some(TokenKind::As) {
            let alias_token = self
                .tokens
                .get(cursor + 1)
                .filter(|t| t.kind == TokenKind::Identifier)
                .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected an identifier after `as`"))?;
            cursor += 2;
            Some(alias_token.lexeme.to_string())
        } else {
            None
        };

        let index = self.namespace.definitions.len();
        self.namespace
            .definitions
            .push(Definition::Import(ImportDef { path, alias, span }));
        self.namespace.declare_symbol(format!("__import_{index}"), index, false);
        Ok(self.skip_to_eol(cursor))
    }

    fn parse_type_alias(&mut self, start: usize, span: Span) -> Result<usize, ProductionError> {
        let name_token = self
            .tokens
            .get(start + 1)
            .filter(|t| t.kind == TokenKind::Identifier)
            .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a name after `type`"))?;
        let name = name_token.lexeme.to_string();
        if self.tokens.get(start + 2).map(|t| t.kind) != Some(TokenKind::Alias) {
            return Err(ProductionError::validation(ErrorKind::ErrParsing, "expected `alias` in a type alias definition"));
        }
        let (aliased, end) = TypeParser::new(self.tokens, self.namespace).parse(start + 3)?;
        let index = self.namespace.definitions.len();
        self.namespace
            .definitions
            .push(Definition::TypeAlias(TypeAliasDef { name: name.clone(), aliased, span }));
        self.namespace.declare_symbol(name.clone(), index, true);
        let _ = self.namespace.define_named_type(name, crate::types::Type::Alias(name_token.lexeme.to_string(), aliased));
        Ok(self.skip_to_eol(end))
    }

    fn parse_params(&mut self, start: usize) -> Result<(Vec<Param>, usize), ProductionError> {
        let mut params = Vec::new();
        let mut cursor = start + 1; // skip `(`
        if self.tokens.get(cursor).map(|t| t.kind) != Some(TokenKind::RightParen) {
            loop {
                let is_mutable = self.tokens.get(cursor).map(|t| t.kind) == Some(TokenKind::Mut);
                if is_mutable {
                    cursor += 1;
                }
                let name_token = self
                    .tokens
                    .get(cursor)
                    .filter(|t| t.kind == TokenKind::Identifier)
                    .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a parameter name"))?;
                let name = name_token.lexeme.to_string();
                let span = self.span(cursor);
                if self.tokens.get(cursor + 1).map(|t| t.kind) != Some(TokenKind::Colon) {
                    return Err(ProductionError::validation(ErrorKind::ErrParsing, "expected `:` after parameter name"));
                }
                let (ty, end) = TypeParser::new(self.tokens, self.namespace).parse(cursor + 2)?;
                params.push(Param { name, ty, is_mutable, span });
                cursor = end;
                match self.tokens.get(cursor).map(|t| t.kind) {
                    Some(TokenKind::Comma) => cursor += 1,
                    Some(TokenKind::RightParen) => break,
                    _ => return Err(ProductionError::validation(ErrorKind::ErrParsing, "expected `,` or `)` in parameter list")),
                }
            }
        }
        Ok((params, cursor + 1))
    }

    fn parse_function(
        &mut self,
        start: usize,
        is_extern: bool,
        span: Span,
        pending: &mut Vec<PendingBody>,
    ) -> Result<usize, ProductionError> {
        let def_start = if is_extern { start + 1 } else { start }; // skip `extern`
        let name_token = self
            .tokens
            .get(def_start + 1)
            .filter(|t| t.kind == TokenKind::Identifier)
            .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a function name after `def`"))?;
        let name = name_token.lexeme.to_string();
        let (params, params_end) = self.parse_params(def_start + 2)?;

        let mut cursor = params_end;
        let return_type = if self.tokens.get(cursor).map(|t| t.kind) == Some(TokenKind::Arrow) {
            let (ty, end) = TypeParser::new(self.tokens, self.namespace).parse(cursor + 1)?;
            cursor = end;
            ty
        } else {
            let mut table = crate::types::table::GLOBAL_TYPES.write().expect("type table poisoned");
            table.get_primitive_type(crate::types::PrimitiveKind::Void)
        };

        // `extern def read(ptr: &u8) as libc_read` — the trailing alias is
        // only meaningful for extern declarations (§3).
        let extern_name_alias = if is_extern && self.tokens.get(cursor).map(|t| t.kind) == Some(TokenKind::As) {
            let alias_token = self
                .tokens
                .get(cursor + 1)
                .filter(|t| t.kind == TokenKind::Identifier)
                .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a symbol name after `as`"))?;
            cursor += 2;
            Some(alias_token.lexeme.to_string())
        } else {
            None
        };

        let index = self.namespace.definitions.len();
        self.namespace.definitions.push(Definition::Function(FunctionDef {
            name: name.clone(),
            params,
            return_type,
            is_extern,
            extern_name_alias,
            body: None,
            span,
        }));
        self.namespace.declare_symbol(name, index, true);

        if is_extern {
            return Ok(self.skip_to_eol(cursor));
        }

        let next_line = self.skip_to_eol(cursor);
        let depth = self.block_depth(next_line, 0);
        pending.push(PendingBody { target: BodyTarget::TopLevel(index), body_start: next_line, depth });
        Ok(self.skip_block(next_line, depth))
    }

    fn parse_data(&mut self, start: usize, span: Span) -> Result<usize, ProductionError> {
        let mut cursor = start;
        let mut is_shared = false;
        let mut is_immutable = false;
        let mut is_aligned = false;
        while let Some(kind) = self.tokens.get(cursor).map(|t| t.kind) {
            match kind {
                TokenKind::Shared => is_shared = true,
                TokenKind::Immutable => is_immutable = true,
                TokenKind::Aligned => is_aligned = true,
                TokenKind::Data => break,
                _ => return Err(ProductionError::validation(ErrorKind::ErrParsing, "expected `data` in a data definition")),
            }
            cursor += 1;
        }
        let name_token = self
            .tokens
            .get(cursor + 1)
            .filter(|t| t.kind == TokenKind::Identifier)
            .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a name after `data`"))?;
        let name = name_token.lexeme.to_string();

        let body_line = self.skip_to_eol(cursor + 2);
        let (fields, end) = self.parse_field_block(body_line, self.block_depth(body_line, 0))?;

        let index = self.namespace.definitions.len();
        self.namespace
            .definitions
            .push(Definition::Data(DataDef { name: name.clone(), fields, is_shared, is_immutable, is_aligned, span }));
        self.namespace.declare_symbol(name.clone(), index, true);
        let _ = self.namespace.define_named_type(name.clone(), crate::types::Type::Data(name, span.file));
        Ok(end)
    }

    fn parse_field_block(&mut self, start: usize, depth: usize) -> Result<(Vec<Param>, usize), ProductionError> {
        let mut fields = Vec::new();
        let mut cursor = start;
        loop {
            let Some((line_depth, body_start)) = get_leading_indents(self.tokens, cursor) else { break };
            if line_depth < depth {
                break;
            }
            let is_mutable = self.tokens.get(body_start).map(|t| t.kind) == Some(TokenKind::Mut);
            let name_start = if is_mutable { body_start + 1 } else { body_start };
            let name_token = self
                .tokens
                .get(name_start)
                .filter(|t| t.kind == TokenKind::Identifier)
                .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a field name"))?;
            let name = name_token.lexeme.to_string();
            let span = self.span(body_start);
            if self.tokens.get(name_start + 1).map(|t| t.kind) != Some(TokenKind::Colon) {
                return Err(ProductionError::validation(ErrorKind::ErrParsing, "expected `:` after field name"));
            }
            let (ty, end) = TypeParser::new(self.tokens, self.namespace).parse(name_start + 2)?;
            fields.push(Param { name, ty, is_mutable, span });
            cursor = self.skip_to_eol(end);
        }
        Ok((fields, cursor))
    }

    fn parse_name_list_block(&mut self, start: usize, depth: usize) -> Result<(Vec<String>, usize), ProductionError> {
        let mut names = Vec::new();
        let mut cursor = start;
        loop {
            let Some((line_depth, body_start)) = get_leading_indents(self.tokens, cursor) else { break };
            if line_depth < depth {
                break;
            }
            let name_token = self
                .tokens
                .get(body_start)
                .filter(|t| t.kind == TokenKind::Identifier)
                .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a member name"))?;
            names.push(name_token.lexeme.to_string());
            cursor = self.skip_to_eol(body_start + 1);
        }
        Ok((names, cursor))
    }

    fn parse_enum(&mut self, start: usize, span: Span) -> Result<usize, ProductionError> {
        let name_token = self
            .tokens
            .get(start + 1)
            .filter(|t| t.kind == TokenKind::Identifier)
            .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a name after `enum`"))?;
        let name = name_token.lexeme.to_string();
        let body_line = self.skip_to_eol(start + 2);
        let (members, end) = self.parse_name_list_block(body_line, self.block_depth(body_line, 0))?;
        let index = self.namespace.definitions.len();
        self.namespace
            .definitions
            .push(Definition::Enum(EnumDef { name: name.clone(), members: members.clone(), span }));
        self.namespace.declare_symbol(name.clone(), index, true);
        let _ = self.namespace.define_named_type(name.clone(), crate::types::Type::Enum(name, span.file, members));
        Ok(end)
    }

    fn parse_variant(&mut self, start: usize, span: Span) -> Result<usize, ProductionError> {
        let name_token = self
            .tokens
            .get(start + 1)
            .filter(|t| t.kind == TokenKind::Identifier)
            .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a name after `variant`"))?;
        let name = name_token.lexeme.to_string();
        let body_line = self.skip_to_eol(start + 2);
        let depth = self.block_depth(body_line, 0);

        let mut cases = Vec::new();
        let mut cursor = body_line;
        loop {
            let Some((line_depth, body_start)) = get_leading_indents(self.tokens, cursor) else { break };
            if line_depth < depth {
                break;
            }
            let case_name = self
                .tokens
                .get(body_start)
                .filter(|t| t.kind == TokenKind::Identifier)
                .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a variant case name"))?
                .lexeme
                .to_string();
            let mut next = body_start + 1;
            let payload = if self.tokens.get(next).map(|t| t.kind) == Some(TokenKind::LeftParen) {
                let (ty, end) = TypeParser::new(self.tokens, self.namespace).parse(next)?;
                next = end;
                Some(ty)
            } else {
                None
            };
            cases.push((case_name, payload));
            cursor = self.skip_to_eol(next);
        }

        let index = self.namespace.definitions.len();
        self.namespace
            .definitions
            .push(Definition::Variant(VariantDef { name: name.clone(), cases: cases.clone(), span }));
        self.namespace.declare_symbol(name.clone(), index, true);
        let _ = self.namespace.define_named_type(name.clone(), crate::types::Type::Variant(name, span.file, cases));
        Ok(cursor)
    }

    fn parse_error_set(&mut self, start: usize, span: Span) -> Result<usize, ProductionError> {
        let name_token = self
            .tokens
            .get(start + 1)
            .filter(|t| t.kind == TokenKind::Identifier)
            .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a name after `error`"))?;
        let name = name_token.lexeme.to_string();

        let mut cursor = start + 2;
        let parent_error = if self.tokens.get(cursor).map(|t| t.kind) == Some(TokenKind::Colon) {
            let parent_token = self
                .tokens
                .get(cursor + 1)
                .filter(|t| t.kind == TokenKind::Identifier)
                .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a parent error set after `:`"))?;
            cursor += 2;
            Some(parent_token.lexeme.to_string())
        } else if name != "anyerror" {
            Some("anyerror".to_string())
        } else {
            None
        };

        let body_line = self.skip_to_eol(cursor);
        let (names, end) = self.parse_name_list_block(body_line, self.block_depth(body_line, 0))?;
        // Final ids are patched in by the resolver once `parent_error`'s
        // total value count across files is known; until then each value's
        // id is just its position within this definition (§3: "an implicit
        // id equal to parent.value_count + local_index").
        let members: Vec<_> = names
            .into_iter()
            .enumerate()
            .map(|(local_index, name)| crate::ast::ErrorValue { name, id: local_index as u32 })
            .collect();
        let member_names: Vec<String> = members.iter().map(|m| m.name.clone()).collect();
        let index = self.namespace.definitions.len();
        self.namespace.definitions.push(Definition::ErrorSet(ErrorSetDef {
            name: name.clone(),
            parent_error,
            members,
            span,
        }));
        self.namespace.declare_symbol(name.clone(), index, true);
        let _ = self
            .namespace
            .define_named_type(name.clone(), crate::types::Type::ErrorSet(name, span.file, member_names));
        Ok(end)
    }

    fn parse_entity(&mut self, start: usize, span: Span, pending: &mut Vec<PendingBody>) -> Result<usize, ProductionError> {
        let name_token = self
            .tokens
            .get(start + 1)
            .filter(|t| t.kind == TokenKind::Identifier)
            .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a name after `entity`"))?;
        let name = name_token.lexeme.to_string();
        let mut cursor = start + 2;

        let extends = if self.tokens.get(cursor).map(|t| t.kind) == Some(TokenKind::Extends) {
            let parent = self
                .tokens
                .get(cursor + 1)
                .filter(|t| t.kind == TokenKind::Identifier)
                .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a parent entity name after `extends`"))?;
            cursor += 2;
            Some(parent.lexeme.to_string())
        } else {
            None
        };

        let mut links = Vec::new();
        while self.tokens.get(cursor).map(|t| t.kind) == Some(TokenKind::Link) {
            let linked = self
                .tokens
                .get(cursor + 1)
                .filter(|t| t.kind == TokenKind::Identifier)
                .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected an entity name after `link`"))?;
            links.push(linked.lexeme.to_string());
            cursor += 2;
        }

        let index = self.namespace.definitions.len();
        self.namespace.definitions.push(Definition::Entity(EntityDef {
            name: name.clone(),
            extends,
            links,
            functions: Vec::new(),
            data: Vec::new(),
            span,
        }));
        self.namespace.declare_symbol(name.clone(), index, true);
        let _ = self.namespace.define_named_type(name.clone(), crate::types::Type::Data(name, span.file));

        // The body is a nested block of function/data items, each registered
        // into this entity's own definition rather than the file's top-level
        // symbol table (§3: "an entity's members are scoped to it").
        let body_line = self.skip_to_eol(cursor);
        let member_depth = self.block_depth(body_line, 0);
        let (functions, data, end) = self.parse_entity_members(body_line, member_depth, index, pending)?;
        if let Definition::Entity(def) = &mut self.namespace.definitions[index] {
            def.functions = functions;
            def.data = data;
        }
        Ok(end)
    }

    /// Parse the member lines of an entity body at absolute indent `depth`
    /// (1 for a top-level entity), registering each `def`/`data` item
    /// locally rather than as a file-level definition. Non-extern function
    /// members are queued as [`PendingBody`]s targeting this entity's
    /// `functions` vector by index, exactly as top-level functions are
    /// queued against `namespace.definitions`.
    fn parse_entity_members(
        &mut self,
        start: usize,
        depth: usize,
        entity_index: usize,
        pending: &mut Vec<PendingBody>,
    ) -> Result<(Vec<FunctionDef>, Vec<DataDef>, usize), ProductionError> {
        let mut functions = Vec::new();
        let mut data = Vec::new();
        let mut cursor = start;
        loop {
            let Some((line_depth, body_start)) = get_leading_indents(self.tokens, cursor) else { break };
            if line_depth != depth {
                break;
            }
            let is_function_member = patterns::extern_function_declaration().eval(self.tokens, body_start).is_some()
                || patterns::function_signature().eval(self.tokens, body_start).is_some();
            let is_data_member = patterns::data_definition().eval(self.tokens, body_start).is_some();
            match () {
                _ if is_function_member => {
                    let is_extern = self.tokens.get(body_start).map(|t| t.kind) == Some(TokenKind::Extern);
                    let def_start = if is_extern { body_start + 1 } else { body_start };
                    let member_span = self.span(body_start);
                    let name_token = self
                        .tokens
                        .get(def_start + 1)
                        .filter(|t| t.kind == TokenKind::Identifier)
                        .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a function name after `def`"))?;
                    let fname = name_token.lexeme.to_string();
                    let (params, params_end) = self.parse_params(def_start + 2)?;

                    let mut c = params_end;
                    let return_type = if self.tokens.get(c).map(|t| t.kind) == Some(TokenKind::Arrow) {
                        let (ty, end) = TypeParser::new(self.tokens, self.namespace).parse(c + 1)?;
                        c = end;
                        ty
                    } else {
                        let mut table = crate::types::table::GLOBAL_TYPES.write().expect("type table poisoned");
                        table.get_primitive_type(crate::types::PrimitiveKind::Void)
                    };

                    let extern_name_alias = if is_extern && self.tokens.get(c).map(|t| t.kind) == Some(TokenKind::As) {
                        let alias_token = self
                            .tokens
                            .get(c + 1)
                            .filter(|t| t.kind == TokenKind::Identifier)
                            .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a symbol name after `as`"))?;
                        c += 2;
                        Some(alias_token.lexeme.to_string())
                    } else {
                        None
                    };

                    let function_index = functions.len();
                    functions.push(FunctionDef {
                        name: fname,
                        params,
                        return_type,
                        is_extern,
                        extern_name_alias,
                        body: None,
                        span: member_span,
                    });

                    if is_extern {
                        cursor = self.skip_to_eol(c);
                    } else {
                        let next_line = self.skip_to_eol(c);
                        let body_depth = self.block_depth(next_line, depth);
                        pending.push(PendingBody {
                            target: BodyTarget::EntityFunction { entity_index, function_index },
                            body_start: next_line,
                            depth: body_depth,
                        });
                        cursor = self.skip_block(next_line, body_depth);
                    }
                }
                _ if is_data_member => {
                    let member_span = self.span(body_start);
                    let mut c = body_start;
                    let mut is_shared = false;
                    let mut is_immutable = false;
                    let mut is_aligned = false;
                    loop {
                        match self.tokens.get(c).map(|t| t.kind) {
                            Some(TokenKind::Shared) => is_shared = true,
                            Some(TokenKind::Immutable) => is_immutable = true,
                            Some(TokenKind::Aligned) => is_aligned = true,
                            Some(TokenKind::Data) => break,
                            _ => return Err(ProductionError::validation(ErrorKind::ErrParsing, "expected `data` in a data definition")),
                        }
                        c += 1;
                    }
                    let name_token = self
                        .tokens
                        .get(c + 1)
                        .filter(|t| t.kind == TokenKind::Identifier)
                        .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a name after `data`"))?;
                    let dname = name_token.lexeme.to_string();
                    let field_line = self.skip_to_eol(c + 2);
                    let (fields, end) = self.parse_field_block(field_line, self.block_depth(field_line, depth))?;
                    data.push(DataDef {
                        name: dname,
                        fields,
                        is_shared,
                        is_immutable,
                        is_aligned,
                        span: member_span,
                    });
                    cursor = end;
                }
                _ => {
                    return Err(ProductionError::validation(
                        ErrorKind::ErrParsing,
                        "expected a function or data definition inside an entity body",
                    ))
                }
            }
        }
        Ok((functions, data, cursor))
    }

    fn parse_test(&mut self, start: usize, span: Span, pending: &mut Vec<PendingBody>) -> Result<usize, ProductionError> {
        let name_token = self
            .tokens
            .get(start + 1)
            .filter(|t| t.kind == TokenKind::StrValue)
            .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a name string after `test`"))?;
        let name = name_token.lexeme.trim_matches('"').to_string();

        let index = self.namespace.definitions.len();
        self.namespace
            .definitions
            .push(Definition::Test(TestDef { name: name.clone(), body: Vec::new(), span }));
        self.namespace.declare_symbol(format!("test:{name}"), index, false);

        let next_line = self.skip_to_eol(start + 2);
        let depth = self.block_depth(next_line, 0);
        pending.push(PendingBody { target: BodyTarget::TopLevel(index), body_start: next_line, depth });
        Ok(self.skip_block(next_line, depth))
    }

    fn skip_to_eol(&self, mut index: usize) -> usize {
        while let Some(token) = self.tokens.get(index) {
            index += 1;
            if token.kind == TokenKind::Eol {
                break;
            }
        }
        index
    }

    /// The literal indentation depth of a block that follows a header at
    /// `header_depth`, discovered by peeking at `start` rather than assumed
    /// to be `header_depth + 1` — indentation in this grammar is a raw
    /// leading-whitespace count, not a nesting level, so a block may be
    /// indented by more than one additional unit of whitespace. When `start`
    /// is not itself part of a block (an empty body), the exact value
    /// returned doesn't matter: every block-scanning loop here stops
    /// immediately once it sees a depth that isn't strictly greater than
    /// `header_depth`.
    fn block_depth(&self, start: usize, header_depth: usize) -> usize {
        match get_leading_indents(self.tokens, start) {
            Some((line_depth, _)) if line_depth > header_depth => line_depth,
            _ => header_depth + 1,
        }
    }

    /// Skip past every line indented at least `depth`, used to jump over a
    /// block whose contents will be parsed later (by `body_pass`) or whose
    /// contents this pass already consumed structurally.
    fn skip_block(&self, start: usize, depth: usize) -> usize {
        let mut cursor = start;
        loop {
            match get_leading_indents(self.tokens, cursor) {
                Some((line_depth, _)) if line_depth >= depth => cursor = self.skip_to_eol(cursor),
                _ => break,
            }
        }
        cursor
    }

    fn span(&self, index: usize) -> Span {
        self.tokens
            .get(index)
            .map(|t| Span::new(t.file, t.line, t.column))
            .unwrap_or(Span::new(crate::hash::FileHash::NONE, 0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::FileHash;
    use crate::lexer::Lexer;
    use crate::source::SourceCode;

    /// Lex and run both passes over `text`, returning the populated namespace.
    fn parse_source(text: &str) -> Namespace {
        let source = SourceCode::new(text);
        let lexer = Lexer::new(&source, FileHash::NONE);
        let tokens = lexer.tokenize().unwrap();
        let mut ns = Namespace::new(FileHash::NONE, None);
        let pending = DefinitionPass::new(&tokens, &mut ns).run().unwrap();
        crate::parser::body_pass::run(&tokens, &mut ns, &pending, false).unwrap();
        ns
    }

    #[test]
    fn entity_body_registers_nested_function_and_data_members() {
        let ns = parse_source(
            "entity Counter\n  data State\n    count: i32\n  def bump(amount: i32) -> i32\n    return amount\n",
        );
        let Definition::Entity(def) = &ns.definitions[0] else { panic!("expected an entity definition") };
        assert_eq!(def.data.len(), 1);
        assert_eq!(def.data[0].name, "State");
        assert_eq!(def.data[0].fields.len(), 1);
        assert_eq!(def.data[0].fields[0].name, "count");
        assert_eq!(def.functions.len(), 1);
        assert_eq!(def.functions[0].name, "bump");
        assert_eq!(def.functions[0].body.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn error_set_without_explicit_parent_defaults_to_anyerror() {
        let ns = parse_source("error IoError\n  NotFound\n  PermissionDenied\n");
        let Definition::ErrorSet(def) = &ns.definitions[0] else { panic!("expected an error set definition") };
        assert_eq!(def.parent_error.as_deref(), Some("anyerror"));
        assert_eq!(def.members.len(), 2);
        assert_eq!(def.members[0].name, "NotFound");
        assert_eq!(def.members[1].id, 1);
    }

    #[test]
    fn function_body_indented_by_more_than_one_space_still_parses() {
        // Four leading spaces, not a single unit of indentation: this only
        // works if the block depth is the depth actually observed on the
        // body's first line rather than a fixed `header_depth + 1`.
        let ns = parse_source("def identity(x: i32) -> i32\n    return x\n");
        let Definition::Function(def) = &ns.definitions[0] else { panic!("expected a function definition") };
        assert_eq!(def.body.as_ref().unwrap().len(), 1);
    }
}
