use super::derived_trait_names;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::Parser;
use syn::{DeriveInput, Lit, LitStr, Meta};

pub fn expand_module_config(args: TokenStream, input: DeriveInput) -> TokenStream {
    let module_id = match parse_module_id(args, &input) {
        Ok(id) => id,
        Err(err) => return err,
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let debug_derive = if derived_trait_names(&input.attrs).contains("Debug") {
        quote! {}
    } else {
        quote! { #[derive(Debug)] }
    };

    quote! {
        #debug_derive
        #input

        #[automatically_derived]
        impl #impl_generics ::tlib_registry::ModuleConfig for #name #ty_generics #where_clause {
            const MODULE_ID: &'static str = #module_id;
        }
    }
}

fn parse_module_id(args: TokenStream, input: &DeriveInput) -> Result<LitStr, TokenStream> {
    let parser = syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated;
    let metas = parser.parse2(args).map_err(|err| err.to_compile_error())?;

    let mut module_id: Option<LitStr> = None;
    for meta in metas {
        let Meta::NameValue(name_value) = meta else {
            return Err(syn::Error::new_spanned(meta, "Expected `id = \"...\"`").to_compile_error());
        };

        if !name_value.path.is_ident("id") {
            return Err(syn::Error::new_spanned(
                name_value.path,
                "Only `id = \"...\"` is supported",
            )
            .to_compile_error());
        }

        if module_id.is_some() {
            return Err(syn::Error::new_spanned(name_value, "Duplicate `id = \"...\"` argument")
                .to_compile_error());
        }

        let syn::Expr::Lit(syn::ExprLit { lit: Lit::Str(lit), .. }) = &name_value.value else {
            return Err(syn::Error::new_spanned(
                &name_value.value,
                "Expected string literal for `id = \"...\"`",
            )
            .to_compile_error());
        };

        if lit.value().trim().is_empty() {
            return Err(syn::Error::new_spanned(lit, "Module id cannot be empty").to_compile_error());
        }

        module_id = Some(lit.clone());
    }

    Ok(module_id
        .unwrap_or_else(|| LitStr::new(&to_snake_case(&input.ident.to_string()), Span::call_site())))
}

fn to_snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, ch) in ident.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
