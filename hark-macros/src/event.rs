//! `#[derive(Event)]`.
//!
//! Container attribute, all keys optional:
//!
//! ```rust,ignore
//! #[derive(Event)]
//! #[event(name = "PlayerJoin", cancellable, extends(dyn PlayerEvent))]
//! struct Join {
//!     player: Player,
//!     #[cancelled]
//!     cancelled: bool,
//! }
//! ```
//!
//! A `#[cancelled]` field implies `cancellable` and generates the
//! `Cancellable` impl. `cancellable` without such a field expects a
//! hand-written `Cancellable` impl.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Fields, Ident, LitStr, Member, Token, Type, TypeParamBound, parenthesized,
    parse::{Parse, ParseStream},
    parse_quote,
    punctuated::Punctuated,
};

/// Arguments of the `#[event(...)]` container attribute.
#[derive(Default)]
pub(crate) struct EventArgs {
    pub name: Option<LitStr>,
    pub cancellable: bool,
    pub extends: Vec<Type>,
}

impl Parse for EventArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = EventArgs::default();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;

            match ident.to_string().as_str() {
                "name" => {
                    input.parse::<Token![=]>()?;
                    args.name = Some(input.parse()?);
                }
                "cancellable" => {
                    args.cancellable = true;
                }
                "extends" => {
                    let content;
                    parenthesized!(content in input);
                    let types = Punctuated::<Type, Token![,]>::parse_terminated(&content)?;
                    args.extends.extend(types);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown event attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(args)
    }
}

/// Implementation of `#[derive(Event)]`.
pub fn derive_event_impl(input: DeriveInput) -> syn::Result<TokenStream> {
    let mut args = EventArgs::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("event")) {
        let parsed: EventArgs = attr.parse_args()?;
        args.name = parsed.name.or(args.name);
        args.cancellable |= parsed.cancellable;
        args.extends.extend(parsed.extends);
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let name = args
        .name
        .unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));
    let flag = cancelled_field(&input.data)?;
    let cancellable = args.cancellable || flag.is_some();

    let cancellable_methods = cancellable.then(|| {
        quote! {
            fn as_cancellable(&self) -> ::core::option::Option<&dyn ::hark::Cancellable> {
                ::core::option::Option::Some(self)
            }

            fn as_cancellable_mut(&mut self) -> ::core::option::Option<&mut dyn ::hark::Cancellable> {
                ::core::option::Option::Some(self)
            }
        }
    });

    let cancellable_impl = flag.map(|member| {
        quote! {
            impl #impl_generics ::hark::Cancellable for #ident #ty_generics #where_clause {
                fn is_cancelled(&self) -> bool {
                    self.#member
                }

                fn set_cancelled(&mut self, cancelled: bool) {
                    self.#member = cancelled;
                }
            }
        }
    });

    let extends_impls = args.extends.into_iter().map(|mut supertype| {
        if let Type::TraitObject(object) = &mut supertype {
            let has_lifetime = object
                .bounds
                .iter()
                .any(|bound| matches!(bound, TypeParamBound::Lifetime(_)));
            if !has_lifetime {
                object.bounds.push(parse_quote!('static));
            }
        }

        quote! {
            impl #impl_generics ::hark::Extends<#supertype> for #ident #ty_generics #where_clause {
                fn upcast(&self) -> &(#supertype) {
                    self
                }

                fn upcast_mut(&mut self) -> &mut (#supertype) {
                    self
                }
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::hark::Event for #ident #ty_generics #where_clause {
            fn event_name(&self) -> &'static str {
                <Self as ::hark::EventType>::NAME
            }

            #cancellable_methods
        }

        impl #impl_generics ::hark::EventType for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;
            const CANCELLABLE: bool = #cancellable;
        }

        #cancellable_impl

        #(#extends_impls)*
    })
}

/// Finds the single field marked `#[cancelled]`.
fn cancelled_field(data: &Data) -> syn::Result<Option<Member>> {
    let Data::Struct(data) = data else {
        return Ok(None);
    };

    let mut found: Option<Member> = None;
    let fields = match &data.fields {
        Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
        Fields::Unnamed(unnamed) => unnamed.unnamed.iter().collect(),
        Fields::Unit => Vec::new(),
    };

    for (index, field) in fields.into_iter().enumerate() {
        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("cancelled")) else {
            continue;
        };
        if found.is_some() {
            return Err(syn::Error::new_spanned(
                attr,
                "only one field can be marked #[cancelled]",
            ));
        }
        found = Some(match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(index.into()),
        });
    }

    Ok(found)
}
