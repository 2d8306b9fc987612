use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one against a freshly
/// built server, injecting its dependencies.
///
/// Injectable dependencies are [`rocket::local::asynchronous::Client`] and
/// the server's [`crate::model::store::Store`]. Each test gets its own empty
/// store, so tests never see each other's surveys.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    if !args.is_empty() {
        return syn::Error::new(
            TokenStream2::from(args).span(),
            "`backend_test` takes no arguments",
        )
        .into_compile_error()
        .into();
    }

    // Extract type information and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup() -> (rocket::local::asynchronous::Client, crate::model::store::Store) {
                let rocket_client = rocket::local::asynchronous::Client::tracked(crate::build())
                    .await
                    .unwrap();
                let store = rocket_client
                    .rocket()
                    .state::<crate::model::store::Store>()
                    .unwrap()
                    .clone();
                (rocket_client, store)
            }

            /// The test itself.
            #item_fn

            log4rs_test_utils::test_logging::init_logging_once_for(["survey_backend"], None, None);

            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                let (rocket_client, store) = setup().await;
                #new_name(#(#test_args),*).await;
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_store = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                if let Some(type_ident) = type_path.path.get_ident() {
                    if type_ident == "Client" {
                        if has_client {
                            return Err(syn::Error::new(
                                input.span(),
                                "Test cannot accept more than one `rocket::local::asynchronous::Client`",
                            ));
                        }
                        has_client = true;
                        args.push(quote! { rocket_client });
                        continue;
                    } else if type_ident == "Store" {
                        if has_store {
                            return Err(syn::Error::new(
                                input.span(),
                                "Test cannot accept more than one `Store`",
                            ));
                        }
                        has_store = true;
                        args.push(quote! { store.clone() });
                        continue;
                    }
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client` or `store_ident: Store`",
        ));
    }

    Ok(args)
}
