use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemStruct, parse_macro_input};

extern crate proc_macro;

/// Stamps the derive bundle every action config struct needs and implements
/// the `ActionConfig` marker. Expects `ActionConfig` to be in scope at the
/// use site.
#[proc_macro_attribute]
pub fn action_config(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(item as ItemStruct);
    let input_struct = &ast.ident;
    let expanded = quote! {
        #[derive(
            serde::Deserialize,
            std::fmt::Debug,
            std::clone::Clone
        )]
        #ast

        impl ActionConfig for #input_struct{}
    };

    TokenStream::from(expanded)
}
