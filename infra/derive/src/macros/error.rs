use super::derived_trait_names;
use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, GenericArgument, Ident, PathArguments, Type, Variant};

const CONTEXT_FIELD: &str = "context";
const SOURCE_FIELD: &str = "source";

pub fn expand_error(input: DeriveInput) -> TokenStream {
    match ErrorEnum::parse(&input) {
        Ok(error_enum) => error_enum.expand(&input),
        Err(err) => err.to_compile_error(),
    }
}

/// The annotated enum, validated.
struct ErrorEnum {
    name: Ident,
    ext_trait: Ident,
    variants: Vec<ErrorVariant>,
}

/// A variant: every one carries `context`, some wrap an upstream `source`.
struct ErrorVariant {
    ident: Ident,
    cfg_attrs: Vec<Attribute>,
    source: Option<Type>,
}

impl ErrorEnum {
    fn parse(input: &DeriveInput) -> syn::Result<Self> {
        let Data::Enum(data) = &input.data else {
            return Err(syn::Error::new_spanned(&input.ident, "tlib_error can only be applied to enums"));
        };

        let mut errors: Option<syn::Error> = None;
        let mut variants = Vec::with_capacity(data.variants.len());
        for variant in &data.variants {
            match ErrorVariant::parse(variant) {
                Ok(v) => variants.push(v),
                Err(err) => push_error(&mut errors, err),
            }
        }

        // Two variants wrapping one type would produce conflicting `From` impls.
        let mut wrapped = FxHashSet::default();
        for ty in variants.iter().filter_map(|v| v.source.as_ref()) {
            if !wrapped.insert(quote!(#ty).to_string()) {
                push_error(
                    &mut errors,
                    syn::Error::new_spanned(ty, "this source type is already wrapped by another variant"),
                );
            }
        }

        if let Some(err) = errors {
            return Err(err);
        }

        Ok(Self {
            name: input.ident.clone(),
            ext_trait: format_ident!("{}Ext", input.ident),
            variants,
        })
    }

    fn expand(&self, input: &DeriveInput) -> TokenStream {
        let Self { name, ext_trait, variants } = self;
        let vis = &input.vis;
        let derives = missing_derives(&input.attrs);

        let slot_arms = variants.iter().map(|v| {
            let ErrorVariant { ident, cfg_attrs, .. } = v;
            quote! { #(#cfg_attrs)* Self::#ident { context, .. } => context, }
        });
        let conversions = variants.iter().filter_map(|v| v.source_conversion(name, ext_trait));

        quote! {
            #derives
            #input

            impl #name {
                fn context_slot(&mut self) -> &mut Option<std::borrow::Cow<'static, str>> {
                    match self {
                        #(#slot_arms)*
                    }
                }
            }

            /// Attaches a human-readable context to a failing result.
            #vis trait #ext_trait<T> {
                /// Builds the context only if the result is an error.
                fn with_context<C, F>(self, context: F) -> Result<T, #name>
                where
                    C: Into<std::borrow::Cow<'static, str>>,
                    F: FnOnce() -> C;

                fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Result<T, #name>
                where
                    Self: Sized,
                {
                    self.with_context(|| context)
                }
            }

            #[automatically_derived]
            impl<T> #ext_trait<T> for Result<T, #name> {
                #[inline]
                fn with_context<C, F>(self, context: F) -> Self
                where
                    C: Into<std::borrow::Cow<'static, str>>,
                    F: FnOnce() -> C,
                {
                    self.map_err(|mut err| {
                        *err.context_slot() = Some(context().into());
                        err
                    })
                }
            }

            #(#conversions)*

            #[allow(dead_code, clippy::ref_option)]
            fn format_context(context: &Option<std::borrow::Cow<'static, str>>) -> String {
                context.as_deref().map(|c| format!(" ({c})")).unwrap_or_default()
            }
        }
    }
}

impl ErrorVariant {
    fn parse(variant: &Variant) -> syn::Result<Self> {
        let Fields::Named(fields) = &variant.fields else {
            return Err(syn::Error::new_spanned(variant, "tlib_error variants must use named fields"));
        };
        let field = |name: &str| {
            fields.named.iter().find(|f| f.ident.as_ref().is_some_and(|ident| ident == name))
        };

        let Some(context) = field(CONTEXT_FIELD) else {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                "every tlib_error variant needs `context: Option<Cow<'static, str>>`",
            ));
        };
        if !is_optional_static_cow(&context.ty) {
            return Err(syn::Error::new_spanned(
                &context.ty,
                "`context` must be `Option<Cow<'static, str>>`",
            ));
        }

        let source = field(SOURCE_FIELD).map(|f| f.ty.clone());
        if source.is_some() && fields.named.len() != 2 {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                "a variant wrapping a `source` may only carry `source` and `context`",
            ));
        }

        Ok(Self {
            ident: variant.ident.clone(),
            cfg_attrs: variant.attrs.iter().filter(|a| a.path().is_ident("cfg")).cloned().collect(),
            source,
        })
    }

    /// `From<Source>` plus the extension trait on `Result<T, Source>`.
    fn source_conversion(&self, name: &Ident, ext_trait: &Ident) -> Option<TokenStream> {
        let Self { ident, cfg_attrs, source } = self;
        let source_ty = source.as_ref()?;

        Some(quote! {
            #(#cfg_attrs)*
            #[automatically_derived]
            impl From<#source_ty> for #name {
                #[inline]
                fn from(source: #source_ty) -> Self {
                    Self::#ident { source, context: None }
                }
            }

            #(#cfg_attrs)*
            #[automatically_derived]
            impl<T> #ext_trait<T> for Result<T, #source_ty> {
                #[inline]
                fn with_context<C, F>(self, context: F) -> Result<T, #name>
                where
                    C: Into<std::borrow::Cow<'static, str>>,
                    F: FnOnce() -> C,
                {
                    self.map_err(|source| #name::#ident { source, context: Some(context().into()) })
                }
            }
        })
    }
}

fn missing_derives(attrs: &[Attribute]) -> TokenStream {
    let present = derived_trait_names(attrs);
    let debug = (!present.contains("Debug")).then(|| quote! { Debug });
    let error = (!present.contains("Error")).then(|| quote! { ::thiserror::Error });
    let missing: Vec<_> = debug.into_iter().chain(error).collect();

    if missing.is_empty() { quote! {} } else { quote! { #[derive(#(#missing),*)] } }
}

fn push_error(errors: &mut Option<syn::Error>, err: syn::Error) {
    match errors {
        Some(existing) => existing.combine(err),
        None => *errors = Some(err),
    }
}

fn is_optional_static_cow(ty: &Type) -> bool {
    let Some(option_args) = angle_args(ty, "Option") else {
        return false;
    };
    let [GenericArgument::Type(inner)] = option_args.as_slice() else {
        return false;
    };
    let Some(cow_args) = angle_args(inner, "Cow") else {
        return false;
    };
    matches!(
        cow_args.as_slice(),
        [GenericArgument::Lifetime(lt), GenericArgument::Type(Type::Path(s))]
            if lt.ident == "static" && s.path.is_ident("str")
    )
}

/// Generic arguments of `ty` if its last path segment is `name`.
fn angle_args<'a>(ty: &'a Type, name: &str) -> Option<Vec<&'a GenericArgument>> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last().filter(|s| s.ident == name)?;
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    Some(args.args.iter().collect())
}
