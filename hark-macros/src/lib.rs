use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod event;

/// Derive macro for implementing `Event` and `EventType`.
///
/// See the `event` module docs for the accepted attributes.
#[proc_macro_derive(Event, attributes(event, cancelled))]
pub fn derive_event(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    event::derive_event_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
