use proc_macro::{Delimiter, TokenStream, TokenTree};

/// Splits a `TokenStream` into comma-separated arguments.
///
/// Each argument is returned as a `Vec<TokenTree>`.
/// Commas at the top level are used as separators; commas inside groups
/// (parentheses, brackets, braces) belong to their group.
///
/// Commas between closure parameters (`|a, b|`) are not grouped by the
/// tokenizer, so closures passed to the macros must take one parameter.
pub(crate) fn split_args(input: TokenStream) -> Vec<Vec<TokenTree>> {
    let mut args = Vec::new();
    let mut current = Vec::new();

    for token in input {
        match &token {
            TokenTree::Punct(p) if p.as_char() == ',' => {
                if !current.is_empty() {
                    args.push(current);
                    current = Vec::new();
                }
            }
            _ => current.push(token),
        }
    }

    if !current.is_empty() {
        args.push(current);
    }

    args
}

/// Converts a slice of tokens back into Rust source.
///
/// Going through `TokenStream`'s own printer keeps joint punctuation
/// (`::`, `=>`) intact and separates words that would otherwise merge.
pub(crate) fn tokens_to_string(tokens: &[TokenTree]) -> String {
    tokens.iter().cloned().collect::<TokenStream>().to_string()
}

/// Returns `true` if the tokens at position `i` form a `=>` arrow.
///
/// This is used to detect branch boundaries in `select`-like
/// macro syntax.
fn is_arrow(tokens: &[TokenTree], i: usize) -> bool {
    is_pair(tokens, i, '=', '>')
}

fn is_pair(tokens: &[TokenTree], i: usize, first: char, second: char) -> bool {
    if i + 1 >= tokens.len() {
        return false;
    }

    matches!(
        (&tokens[i], &tokens[i + 1]),
        (TokenTree::Punct(p1), TokenTree::Punct(p2))
            if p1.as_char() == first && p2.as_char() == second
    )
}

/// Parses `select`-style branches from a token stream.
///
/// Each branch is expected to have the form:
///
/// ```text
/// deferred_expr => handler_expr
/// ```
///
/// Multiple branches must be separated by commas.
///
/// The result is a list of `(deferred, handler)` pairs, both
/// returned as source strings.
///
/// Invalid or incomplete branches are ignored.
pub(crate) fn parse_select_branches(input: TokenStream) -> Vec<(String, String)> {
    let mut branches = Vec::new();

    for tokens in split_args(input) {
        let Some(arrow) = (0..tokens.len()).find(|&i| is_arrow(&tokens, i)) else {
            continue;
        };

        let future = tokens_to_string(&tokens[..arrow]);
        let handler = tokens_to_string(&tokens[arrow + 2..]);

        if !future.trim().is_empty() && !handler.trim().is_empty() {
            branches.push((future, handler));
        }
    }

    branches
}

/// The pieces of an annotated `async fn` the attribute macros need.
pub(crate) struct AsyncFn {
    /// Outer attributes (`#[...]`), to be moved onto the generated wrapper.
    pub(crate) attrs: String,

    pub(crate) name: String,

    /// The function itself, without its outer attributes.
    pub(crate) item: String,

    /// Whether the function declares a parameter (the scheduler).
    pub(crate) takes_scheduler: bool,

    /// Whether the function declares a return type.
    pub(crate) returns: bool,
}

/// Splits an attribute macro's input into [`AsyncFn`] parts.
///
/// Returns an error message if the item is not an `async fn` with a body.
pub(crate) fn parse_async_fn(item: TokenStream) -> Result<AsyncFn, String> {
    let tokens: Vec<TokenTree> = item.into_iter().collect();

    let mut start = 0;
    while matches!(tokens.get(start), Some(TokenTree::Punct(p)) if p.as_char() == '#')
        && matches!(tokens.get(start + 1), Some(TokenTree::Group(g)) if g.delimiter() == Delimiter::Bracket)
    {
        start += 2;
    }

    let is_ident = |t: &TokenTree, name: &str| matches!(t, TokenTree::Ident(id) if id.to_string() == name);

    if !tokens[start..].iter().any(|t| is_ident(t, "async")) {
        return Err("the function must be declared `async`".to_string());
    }

    let fn_pos = tokens[start..]
        .iter()
        .position(|t| is_ident(t, "fn"))
        .map(|p| p + start)
        .ok_or_else(|| "expected an `async fn`".to_string())?;

    let name = match tokens.get(fn_pos + 1) {
        Some(TokenTree::Ident(id)) => id.to_string(),
        _ => return Err("expected a function name".to_string()),
    };

    let params = match tokens.get(fn_pos + 2) {
        Some(TokenTree::Group(g)) if g.delimiter() == Delimiter::Parenthesis => g.stream(),
        _ => return Err("generic functions are not supported".to_string()),
    };

    let Some(body) = tokens.iter().rposition(
        |t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace),
    ) else {
        return Err("expected a function body".to_string());
    };

    let returns = (fn_pos + 3..body).any(|i| is_pair(&tokens, i, '-', '>'));

    Ok(AsyncFn {
        attrs: tokens_to_string(&tokens[..start]),
        name,
        item: tokens_to_string(&tokens[start..]),
        takes_scheduler: !params.is_empty(),
        returns,
    })
}

/// Builds a `compile_error!` invocation carrying `message`.
pub(crate) fn compile_error(message: &str) -> TokenStream {
    format!("compile_error!({message:?});")
        .parse()
        .unwrap_or_default()
}
