//! TokenStream-based code generation utilities
//!
//! This module provides helper functions for generating Rust code using
//! proc-macro2 `TokenStreams` and the quote macro. The generated code is
//! formatted using prettyplease for consistent output.

use proc_macro2::{Ident, Span, TokenStream};
use quote::{ToTokens, quote};

/// Parse a type string into a `TokenStream`
///
/// Handles types like:
/// - `u32`, `i64`, `bool`
/// - `Vec<u8>`
/// - `[f64; 9]`
/// - `::std::string::String`
/// - `super::point::Point`
pub(super) fn parse_type(type_str: &str) -> syn::Result<TokenStream> {
    // Remove comments from type strings (e.g., "Vec<u8> /* max_size: 10 */")
    let type_str = remove_comments(type_str);
    let parsed: syn::Type = syn::parse_str(type_str.trim())?;
    Ok(parsed.into_token_stream())
}

/// Remove all /* */ comments from a string, preserving the rest
fn remove_comments(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'*') {
            chars.next(); // consume '*'
            while let Some(c2) = chars.next() {
                if c2 == '*' && chars.peek() == Some(&'/') {
                    chars.next(); // consume '/'
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Parse a derive name such as `Debug` or `serde::Serialize` into tokens
pub(super) fn parse_derive(derive_str: &str) -> syn::Result<TokenStream> {
    let path: syn::Path = syn::parse_str(derive_str.trim())?;
    Ok(path.into_token_stream())
}

/// Parse a value expression into tokens
fn parse_expr(value_str: &str) -> syn::Result<TokenStream> {
    let expr: syn::Expr = syn::parse_str(value_str)?;
    Ok(expr.into_token_stream())
}

/// Create an identifier, handling raw identifiers like `r#type`
fn ident(name: &str) -> Ident {
    match name.strip_prefix("r#") {
        Some(raw_name) => Ident::new_raw(raw_name, Span::call_site()),
        None => Ident::new(name, Span::call_site()),
    }
}

/// Doc attributes for a comment, one per line
fn doc_attrs(doc: Option<&str>) -> TokenStream {
    let lines = doc.into_iter().flat_map(str::lines).map(|line| {
        let line = line.trim_end();
        if line.is_empty() {
            String::new()
        } else {
            format!(" {line}")
        }
    });
    quote! { #(#[doc = #lines])* }
}

/// Generate a struct definition with docs and derives
pub(super) fn generate_struct(
    name: &str,
    doc: Option<&str>,
    derives: &[String],
    fields: &[StructField],
) -> syn::Result<TokenStream> {
    let struct_name = ident(name);
    let docs = doc_attrs(doc);

    let derive_tokens = derives
        .iter()
        .map(|d| parse_derive(d))
        .collect::<syn::Result<Vec<_>>>()?;
    let derives_attr = if derive_tokens.is_empty() {
        quote! {}
    } else {
        quote! { #[derive(#(#derive_tokens),*)] }
    };

    let field_tokens = fields
        .iter()
        .map(|f| {
            let field_name = ident(&f.name);
            let field_type = parse_type(&f.rust_type)?;
            let field_docs = doc_attrs(f.doc.as_deref());

            Ok(quote! {
                #field_docs
                pub #field_name: #field_type,
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        #docs
        #derives_attr
        pub struct #struct_name {
            #(#field_tokens)*
        }
    })
}

/// Generate a Default implementation
pub(super) fn generate_default_impl(
    name: &str,
    field_defaults: &[FieldDefault],
) -> syn::Result<TokenStream> {
    let struct_name = ident(name);

    let field_inits = field_defaults
        .iter()
        .map(|f| {
            let field_name = ident(&f.name);
            let default_value = parse_expr(&f.default_value)?;

            Ok(quote! {
                #field_name: #default_value,
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl ::core::default::Default for #struct_name {
            #[inline]
            fn default() -> Self {
                Self {
                    #(#field_inits)*
                }
            }
        }
    })
}

/// Generate constants in an impl block
pub(super) fn generate_constants_impl(
    struct_name: &str,
    constants: &[ConstantDef],
) -> syn::Result<TokenStream> {
    if constants.is_empty() {
        return Ok(quote! {});
    }

    let name = ident(struct_name);

    let const_tokens = constants
        .iter()
        .map(|c| {
            let const_name = ident(&c.name);
            let const_type = parse_type(&c.rust_type)?;
            let const_value = parse_expr(&c.value)?;
            let const_docs = doc_attrs(c.doc.as_deref());

            Ok(quote! {
                #const_docs
                pub const #const_name: #const_type = #const_value;
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl #name {
            #(#const_tokens)*
        }
    })
}

/// Generate a fieldless enum with explicit discriminants
pub(super) fn generate_enum(enum_def: &EnumDef) -> syn::Result<TokenStream> {
    let enum_name = ident(&enum_def.name);
    let repr = parse_type(&enum_def.repr)?;
    let docs = doc_attrs(enum_def.doc.as_deref());

    let variant_tokens = enum_def
        .variants
        .iter()
        .map(|v| {
            let variant_name = ident(&v.name);
            let discriminant = parse_expr(&v.discriminant)?;
            let variant_docs = doc_attrs(v.doc.as_deref());

            Ok(quote! {
                #variant_docs
                #variant_name = #discriminant,
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        #docs
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(#repr)]
        pub enum #enum_name {
            #(#variant_tokens)*
        }
    })
}

/// Format a `TokenStream` into a pretty-printed string
pub(super) fn format_tokens(tokens: TokenStream) -> Result<String, syn::Error> {
    let syntax_tree = syn::parse2::<syn::File>(tokens)?;
    Ok(prettyplease::unparse(&syntax_tree))
}

/// Format multiple `TokenStreams` into a single pretty-printed string
pub(super) fn format_token_streams(streams: Vec<TokenStream>) -> Result<String, syn::Error> {
    let combined = streams.into_iter().fold(TokenStream::new(), |mut acc, ts| {
        acc.extend(ts);
        acc
    });
    format_tokens(combined)
}

/// Struct field information for code generation
#[derive(Debug, Clone)]
pub(super) struct StructField {
    /// Field name (already sanitized)
    pub(super) name: String,
    /// Rust type string
    pub(super) rust_type: String,
    /// Field documentation
    pub(super) doc: Option<String>,
}

/// Field default value for Default impl generation
#[derive(Debug, Clone)]
pub(super) struct FieldDefault {
    /// Field name
    pub(super) name: String,
    /// Default value expression as string
    pub(super) default_value: String,
}

/// Constant definition for impl block generation
#[derive(Debug, Clone)]
pub(super) struct ConstantDef {
    /// Constant name
    pub(super) name: String,
    /// Rust type string
    pub(super) rust_type: String,
    /// Value expression as string
    pub(super) value: String,
    /// Constant documentation
    pub(super) doc: Option<String>,
}

/// Enum definition for code generation
#[derive(Debug, Clone)]
pub(super) struct EnumDef {
    /// Enum name
    pub(super) name: String,
    /// Integer representation, e.g. `u8`
    pub(super) repr: String,
    /// Enum documentation
    pub(super) doc: Option<String>,
    /// Variants in declaration order
    pub(super) variants: Vec<VariantDef>,
}

/// Enum variant for code generation
#[derive(Debug, Clone)]
pub(super) struct VariantDef {
    /// Variant name
    pub(super) name: String,
    /// Discriminant expression as string
    pub(super) discriminant: String,
    /// Variant documentation
    pub(super) doc: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, rust_type: &str, doc: Option<&str>) -> StructField {
        StructField {
            name: name.to_string(),
            rust_type: rust_type.to_string(),
            doc: doc.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_types() {
        for type_str in ["u32", "Vec<u8>", "[f64; 9]", "::std::string::String"] {
            assert!(!parse_type(type_str).unwrap().is_empty(), "{type_str}");
        }
    }

    #[test]
    fn test_parse_type_with_comment() {
        let tokens =
            parse_type("Vec<::std::string::String /* max_size: 8 */> /* max_size: 10 */").unwrap();
        let s = tokens.to_string();
        assert!(s.contains("Vec"));
        assert!(!s.contains("max_size"));
    }

    #[test]
    fn test_generate_simple_struct() {
        let fields = vec![
            field("x", "f64", Some("X coordinate")),
            field("y", "f64", None),
            field("r#type", "u8", None),
        ];

        let tokens = generate_struct(
            "Point",
            Some("A point.\n\nIn space."),
            &["Debug".to_string(), "Clone".to_string()],
            &fields,
        )
        .unwrap();

        let formatted = format_tokens(tokens).unwrap();
        let expected_start = "/// A point.\n///\n/// In space.\n#[derive(Debug, Clone)]\n";
        assert!(formatted.starts_with(expected_start));
        assert!(formatted.contains("pub struct Point {\n"));
        assert!(formatted.contains("    /// X coordinate\n    pub x: f64,\n    pub y: f64,\n"));
        assert!(formatted.contains("pub r#type: u8,"));
    }

    #[test]
    fn test_generate_empty_struct() {
        let formatted = format_tokens(generate_struct("Empty", None, &[], &[]).unwrap()).unwrap();
        assert_eq!(formatted, "pub struct Empty {}\n");
    }

    #[test]
    fn test_generate_default_impl() {
        let defaults = vec![
            FieldDefault {
                name: "x".to_string(),
                default_value: "0.5".to_string(),
            },
            FieldDefault {
                name: "names".to_string(),
                default_value: "::std::vec::Vec::new()".to_string(),
            },
        ];

        let tokens = generate_default_impl("Point", &defaults).unwrap();
        let formatted = format_tokens(tokens).unwrap();
        assert!(formatted.contains("impl ::core::default::Default for Point"));
        assert!(formatted.contains("x: 0.5"));
        assert!(formatted.contains("names: ::std::vec::Vec::new()"));
    }

    #[test]
    fn test_generate_constants_impl() {
        let constants = vec![
            ConstantDef {
                name: "MAX_VALUE".to_string(),
                rust_type: "u32".to_string(),
                value: "100".to_string(),
                doc: Some("upper limit".to_string()),
            },
            ConstantDef {
                name: "NAME".to_string(),
                rust_type: "&str".to_string(),
                value: "\"test\"".to_string(),
                doc: None,
            },
            ConstantDef {
                name: "OFFSET".to_string(),
                rust_type: "i8".to_string(),
                value: "-3".to_string(),
                doc: None,
            },
        ];

        let tokens = generate_constants_impl("TestStruct", &constants).unwrap();
        let formatted = format_tokens(tokens).unwrap();
        assert!(formatted.contains("impl TestStruct {\n"));
        assert!(formatted.contains("    /// upper limit\n    pub const MAX_VALUE: u32 = 100;\n"));
        assert!(formatted.contains("pub const NAME: &str = \"test\";"));
        assert!(formatted.contains("pub const OFFSET: i8 = -3;"));
    }

    #[test]
    fn test_no_constants_no_impl() {
        assert!(generate_constants_impl("Empty", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_generate_enum() {
        let enum_def = EnumDef {
            name: "Mode".to_string(),
            repr: "u8".to_string(),
            doc: None,
            variants: vec![
                VariantDef {
                    name: "Idle".to_string(),
                    discriminant: "0".to_string(),
                    doc: Some("waiting".to_string()),
                },
                VariantDef {
                    name: "Active".to_string(),
                    discriminant: "1".to_string(),
                    doc: None,
                },
            ],
        };

        let formatted = format_tokens(generate_enum(&enum_def).unwrap()).unwrap();
        assert_eq!(
            formatted,
            "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]\n\
             #[repr(u8)]\n\
             pub enum Mode {\n    \
             /// waiting\n    \
             Idle = 0,\n    \
             Active = 1,\n\
             }\n"
        );
    }

    #[test]
    fn test_malformed_tokens_are_errors() {
        assert!(parse_derive("Foo(").is_err());
        assert!(parse_derive("serde::Serialize").is_ok());
        assert!(parse_type("a(::Thing").is_err());
        assert!(generate_struct("Point", None, &["Debug, (".to_string()], &[]).is_err());
    }
}
