use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{BinOp, Expr, ExprPath, LitStr, Path, UnOp, spanned::Spanned};

/// `Entity::field`: at least two segments, the last one starts lowercase.
fn property_name(path: &Path) -> Option<String> {
    if path.segments.len() < 2 {
        return None;
    }
    let last = path.segments.last()?.ident.to_string();
    last.chars()
        .next()
        .is_some_and(|c| c.is_lowercase() || c == '_')
        .then_some(last)
}

/// True when the expression references a property anywhere.
fn has_property(expr: &Expr) -> bool {
    match expr {
        Expr::Path(ExprPath { path, .. }) => property_name(path).is_some(),
        Expr::Binary(v) => has_property(&v.left) || has_property(&v.right),
        Expr::Unary(v) => has_property(&v.expr),
        Expr::Paren(v) => has_property(&v.expr),
        Expr::Group(v) => has_property(&v.expr),
        Expr::MethodCall(v) => has_property(&v.receiver) || v.args.iter().any(has_property),
        Expr::Array(v) => v.elems.iter().any(has_property),
        _ => false,
    }
}

/// A Rust expression evaluated where the macro is expanded.
fn evaluated(expr: &Expr) -> TokenStream {
    quote! {
        ::stow::Expr::Value(::stow::Value::from(::std::clone::Clone::clone(&(#expr))))
    }
}

fn error(expr: &impl ToTokens, message: &str) -> TokenStream {
    syn::Error::new(expr.span(), message).to_compile_error()
}

pub(crate) fn decode_expression(expr: &Expr) -> TokenStream {
    if !has_property(expr) {
        if let Expr::Path(ExprPath { path, .. }) = expr
            && path.is_ident("None")
        {
            return quote!(::stow::Expr::Value(::stow::Value::Null));
        }
        return evaluated(expr);
    }
    match expr {
        Expr::Path(ExprPath { path, .. }) => {
            let Some(name) = property_name(path) else {
                return evaluated(expr);
            };
            let name = LitStr::new(&name, path.span());
            quote!(::stow::Expr::Property(#name))
        }
        Expr::Binary(v) => {
            let op = match v.op {
                BinOp::And(..) => quote!(::stow::BinaryOp::And),
                BinOp::Or(..) => quote!(::stow::BinaryOp::Or),
                BinOp::Eq(..) => quote!(::stow::BinaryOp::Equal),
                BinOp::Ne(..) => quote!(::stow::BinaryOp::NotEqual),
                BinOp::Lt(..) => quote!(::stow::BinaryOp::Less),
                BinOp::Le(..) => quote!(::stow::BinaryOp::LessEqual),
                BinOp::Gt(..) => quote!(::stow::BinaryOp::Greater),
                BinOp::Ge(..) => quote!(::stow::BinaryOp::GreaterEqual),
                BinOp::Add(..) => quote!(::stow::BinaryOp::Add),
                BinOp::Sub(..) => quote!(::stow::BinaryOp::Subtract),
                BinOp::Mul(..) => quote!(::stow::BinaryOp::Multiply),
                BinOp::Div(..) => quote!(::stow::BinaryOp::Divide),
                BinOp::Rem(..) => quote!(::stow::BinaryOp::Remainder),
                _ => return error(&v.op, "Unsupported operator in a stow expression"),
            };
            let lhs = decode_expression(&v.left);
            let rhs = decode_expression(&v.right);
            quote! {
                ::stow::Expr::Binary(#op, ::std::boxed::Box::new(#lhs), ::std::boxed::Box::new(#rhs))
            }
        }
        Expr::Unary(v) => {
            let op = match v.op {
                UnOp::Not(..) => quote!(::stow::UnaryOp::Not),
                UnOp::Neg(..) => quote!(::stow::UnaryOp::Negative),
                _ => return error(&v.op, "Unsupported operator in a stow expression"),
            };
            let operand = decode_expression(&v.expr);
            quote!(::stow::Expr::Unary(#op, ::std::boxed::Box::new(#operand)))
        }
        Expr::Paren(v) => decode_expression(&v.expr),
        Expr::Group(v) => decode_expression(&v.expr),
        Expr::MethodCall(v) => {
            let method = LitStr::new(&v.method.to_string(), v.method.span());
            let receiver = decode_expression(&v.receiver);
            let args = v.args.iter().map(|arg| match arg {
                Expr::Array(array) if v.method == "is_in" => {
                    let items = array.elems.iter().map(decode_expression);
                    quote!(::stow::Expr::List(vec![#(#items),*]))
                }
                _ if v.method == "is_in" && !has_property(arg) => quote! {
                    ::stow::Expr::List(
                        ::std::iter::IntoIterator::into_iter(::std::clone::Clone::clone(&(#arg)))
                            .map(|v| ::stow::Expr::Value(::stow::Value::from(v)))
                            .collect(),
                    )
                },
                _ => decode_expression(arg),
            });
            quote! {
                ::stow::Expr::Call(#method, ::std::boxed::Box::new(#receiver), vec![#(#args),*])
            }
        }
        _ => error(expr, "Unsupported expression in a stow expression"),
    }
}
