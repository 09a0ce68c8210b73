//! Procedural macros for the Eventide runtime.
//!
//! These are re-exported by the `eventide` crate; depend on that crate
//! rather than on this one.

mod utils;

use proc_macro::TokenStream;

/// Waits for several deferred values at once.
///
/// `join!(a, b, c)` evaluates to a `Deferred<(A, B, C)>` that fulfills once
/// every input has, and rejects with the first rejection observed. A single
/// argument is returned unchanged.
///
/// ```rust,ignore
/// let (user, orders) = eventide::join!(fetch_user(&s), fetch_orders(&s)).await?;
/// ```
#[proc_macro]
pub fn join(input: TokenStream) -> TokenStream {
    let args = utils::split_args(input);
    let count = args.len();

    if count == 0 {
        return utils::compile_error("join! needs at least one deferred value");
    }

    if count == 1 {
        return format!("{{ {} }}", utils::tokens_to_string(&args[0]))
            .parse()
            .unwrap_or_else(|err| utils::compile_error(&format!("join macro error: {err}")));
    }

    let mut output = String::new();
    output.push_str("{\n");

    for (i, expr_tokens) in args.iter().enumerate() {
        let idx = i + 1;
        let expr = utils::tokens_to_string(expr_tokens);
        output.push_str(&format!("let __j{idx} = {expr};\n"));
    }

    // ((((j1, j2), j3), j4) ...
    let mut zipped = "::eventide::sync::zip(&__j1, &__j2)".to_string();
    let mut pattern = "(__v1, __v2)".to_string();

    for i in 3..=count {
        zipped = format!("::eventide::sync::zip(&{zipped}, &__j{i})");
        pattern = format!("({pattern}, __v{i})");
    }

    let flat = (1..=count)
        .map(|i| format!("__v{i}"))
        .collect::<Vec<_>>()
        .join(", ");

    if count == 2 {
        output.push_str(&zipped);
    } else {
        output.push_str(&format!(
            "::eventide::Deferred::map(&{zipped}, |{pattern}| ({flat}))"
        ));
    }

    output.push_str("\n}\n");

    output.parse().unwrap_or_else(|err| {
        utils::compile_error(&format!("join macro error: {err}"))
    })
}

/// Races several deferred values, each with its own handler.
///
/// ```rust,ignore
/// let winner = eventide::select! {
///     fast => |v| format!("fast: {v}"),
///     slow => |v| format!("slow: {v}"),
/// };
/// ```
///
/// Every handler must produce the same type. The result is a `Deferred`
/// settled by whichever input settles first, mapped through that input's
/// handler; a rejection wins the race as well and skips the handler.
#[proc_macro]
pub fn select(input: TokenStream) -> TokenStream {
    let branches = utils::parse_select_branches(input);

    if branches.is_empty() {
        return utils::compile_error("select! needs at least one `deferred => handler` branch");
    }

    let mut out = String::new();
    out.push_str("{\n");

    for (i, (future, _handler)) in branches.iter().enumerate() {
        let idx = i + 1;
        out.push_str(&format!("let __s{idx} = {future};\n"));
    }

    out.push_str("let __scheduler = ::eventide::Deferred::scheduler(&__s1).clone();\n");
    out.push_str("::eventide::sync::race(&__scheduler, ::std::vec![\n");

    for (i, (_future, handler)) in branches.iter().enumerate() {
        let idx = i + 1;
        out.push_str(&format!(
            "    ::eventide::Deferred::map(&__s{idx}, {handler}),\n"
        ));
    }

    out.push_str("])\n");
    out.push_str("}\n");

    out.parse().unwrap_or_else(|err| {
        utils::compile_error(&format!("select macro error: {err}"))
    })
}

/// Runs an `async fn main` on a fresh runtime.
///
/// The function may take the runtime's `Scheduler` as its only parameter
/// and should return `eventide::Result<()>`. Supported options:
///
/// - `microtask_budget = N`
///
/// ```rust,ignore
/// #[eventide::main(microtask_budget = 10_000)]
/// async fn main(scheduler: Scheduler) -> Result<(), Error> {
///     sleep(&scheduler, Duration::from_secs(1)).await
/// }
/// ```
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    let function = match utils::parse_async_fn(item) {
        Ok(function) => function,
        Err(message) => return utils::compile_error(&message),
    };

    let mut builder = String::from("::eventide::RuntimeBuilder::new()");

    for part in attr.to_string().split(',') {
        let part = part.trim();

        if part.is_empty() {
            continue;
        }

        match part.strip_prefix("microtask_budget") {
            Some(value) => {
                let value = value.trim_start().trim_start_matches('=').trim().replace('_', "");

                match value.parse::<usize>() {
                    Ok(n) if n > 0 => builder.push_str(&format!(".microtask_budget({n})")),
                    _ => return utils::compile_error("microtask_budget expects a positive integer"),
                }
            }
            None => return utils::compile_error(&format!("unknown option `{part}`")),
        }
    }

    builder.push_str(".build()");

    let utils::AsyncFn {
        attrs,
        name,
        item,
        takes_scheduler,
        returns,
    } = function;

    let call = call_expr(&name, takes_scheduler, returns);

    let output = format!(
        "{attrs}
        fn {name}() -> ::eventide::Result<()> {{
            {item}

            let runtime = {builder};
            runtime.block_on({call})
        }}"
    );

    output.parse().unwrap_or_else(|err| {
        utils::compile_error(&format!("main macro error: {err}"))
    })
}

/// Runs an `async fn` test on a fresh runtime.
///
/// The test fails if the function returns an error, if it is still
/// suspended when the scheduler goes idle, or if any rejection went
/// unhandled during the run.
///
/// ```rust,ignore
/// #[eventide::test]
/// async fn sleeps(scheduler: Scheduler) -> Result<(), Error> {
///     sleep(&scheduler, Duration::from_millis(10)).await
/// }
/// ```
#[proc_macro_attribute]
pub fn test(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let function = match utils::parse_async_fn(item) {
        Ok(function) => function,
        Err(message) => return utils::compile_error(&message),
    };

    let utils::AsyncFn {
        attrs,
        name,
        item,
        takes_scheduler,
        returns,
    } = function;

    let call = call_expr(&name, takes_scheduler, returns);

    let output = format!(
        "#[test]
        {attrs}
        fn {name}() {{
            {item}

            let runtime = ::eventide::RuntimeBuilder::new().build();

            if let ::core::result::Result::Err(error) = runtime.block_on({call}) {{
                panic!(\"test failed: {{error}}\");
            }}

            let unhandled = runtime.unhandled_rejections();
            assert!(unhandled.is_empty(), \"unhandled rejections: {{unhandled:?}}\");
        }}"
    );

    output.parse().unwrap_or_else(|err| {
        utils::compile_error(&format!("test macro error: {err}"))
    })
}

/// Builds the future handed to `block_on` for an annotated function.
fn call_expr(name: &str, takes_scheduler: bool, returns: bool) -> String {
    let args = if takes_scheduler {
        "runtime.scheduler()"
    } else {
        ""
    };

    if returns {
        format!("{name}({args})")
    } else {
        format!(
            "{{
                let __body = {name}({args});
                async move {{
                    __body.await;
                    ::core::result::Result::Ok::<(), ::eventide::Error>(())
                }}
            }}"
        )
    }
}
