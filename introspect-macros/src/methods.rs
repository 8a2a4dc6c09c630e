use quote::{format_ident, quote, ToTokens};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Receiver {
    Ref,
    Mut,
}

struct Method {
    ident: syn::Ident,
    receiver: Receiver,
    params: Vec<syn::Type>,
    /// element type of the trailing `Vec<V>` parameter
    variadic: Option<syn::Type>,
    fallible: bool,
}

#[derive(Default)]
struct MethodAttrs {
    skip: bool,
    variadic: bool,
}

/// Removes `#[introspect(..)]` from the method and returns what it said
fn take_method_attrs(method: &mut syn::ImplItemFn) -> syn::Result<MethodAttrs> {
    let mut attrs = MethodAttrs::default();
    let mut result = Ok(());

    method.attrs.retain(|attr| {
        if !attr.path().is_ident("introspect") {
            return true;
        }

        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                attrs.skip = true;
                return Ok(());
            }
            if meta.path.is_ident("variadic") {
                attrs.variadic = true;
                return Ok(());
            }
            Err(meta.error("unsupported introspect method attribute, expected `skip` or `variadic`"))
        });
        if let Err(err) = parsed {
            result = Err(err);
        }
        false
    });

    result.map(|_| attrs)
}

fn last_segment(ty: &syn::Type) -> Option<&syn::PathSegment> {
    match ty {
        syn::Type::Path(path) if path.qself.is_none() => path.path.segments.last(),
        _ => None,
    }
}

/// `V` out of `Vec<V>`
fn vec_elem(ty: &syn::Type) -> Option<syn::Type> {
    let segment = last_segment(ty).filter(|segment| segment.ident == "Vec")?;
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(elem) if args.args.len() == 1 => Some(elem.clone()),
        _ => None,
    }
}

fn is_result(ty: &syn::Type) -> bool {
    last_segment(ty).is_some_and(|segment| segment.ident == "Result")
}

fn is_borrowed(ty: &syn::Type) -> bool {
    matches!(ty, syn::Type::Reference(_) | syn::Type::ImplTrait(_))
}

/// Parameter type as shown in `MethodInfo`
fn type_string(ty: &syn::Type) -> String {
    ty.to_token_stream()
        .to_string()
        .replace(" < ", "<")
        .replace("< ", "<")
        .replace(" >", ">")
        .replace(" :: ", "::")
        .replace(" ,", ",")
}

/*
Decides whether a method is callable by name

Registered are public methods borrowing `self` that take and return owned values.
Anything else is left alone, `#[introspect(variadic)]` on an unfit method is an error
*/
fn collect_method(method: &syn::ImplItemFn, attrs: &MethodAttrs) -> syn::Result<Option<Method>> {
    let sig = &method.sig;
    if attrs.skip || !matches!(method.vis, syn::Visibility::Public(_)) {
        return Ok(None);
    }
    if sig.asyncness.is_some() || !sig.generics.params.is_empty() {
        return Ok(None);
    }

    let receiver = match sig.receiver() {
        Some(receiver) if receiver.reference.is_some() && receiver.colon_token.is_none() => {
            match receiver.mutability {
                Some(_) => Receiver::Mut,
                None => Receiver::Ref,
            }
        }
        _ => return Ok(None),
    };

    let mut params = Vec::new();
    for input in sig.inputs.iter() {
        if let syn::FnArg::Typed(arg) = input {
            if is_borrowed(&arg.ty) {
                return Ok(None);
            }
            params.push((*arg.ty).clone());
        }
    }

    let fallible = match &sig.output {
        syn::ReturnType::Default => false,
        syn::ReturnType::Type(_, ty) if is_borrowed(ty) => return Ok(None),
        syn::ReturnType::Type(_, ty) => is_result(ty),
    };

    let variadic = match attrs.variadic {
        false => None,
        true => {
            let elem = params.last().and_then(vec_elem).ok_or_else(|| {
                syn::Error::new_spanned(sig, "variadic method must take `Vec<T>` as its last parameter")
            })?;
            params.pop();
            Some(elem)
        }
    };

    Ok(Some(Method {
        ident: sig.ident.clone(),
        receiver,
        params,
        variadic,
        fallible,
    }))
}

fn create_method_info(method: &Method) -> proc_macro2::TokenStream {
    let name = method.ident.to_string();
    let receiver = match method.receiver {
        Receiver::Ref => quote! { ::introspect::Receiver::Ref },
        Receiver::Mut => quote! { ::introspect::Receiver::Mut },
    };
    let mut params: Vec<String> = method.params.iter().map(type_string).collect();
    if let Some(elem) = &method.variadic {
        params.push(format!("Vec<{}>", type_string(elem)));
    }
    let variadic = method.variadic.is_some();
    let fallible = method.fallible;

    quote! {
        ::introspect::MethodInfo {
            name: #name,
            receiver: #receiver,
            params: &[#(#params),*],
            variadic: #variadic,
            fallible: #fallible,
        }
    }
}

fn create_dispatch_arm(method: &Method) -> proc_macro2::TokenStream {
    let ident = &method.ident;
    let name = ident.to_string();
    let fixed = method.params.len();
    let is_variadic = method.variadic.is_some();

    let bindings: Vec<syn::Ident> = (0..fixed).map(|index| format_ident!("__arg_{}", index)).collect();
    let takes = bindings.iter().zip(method.params.iter()).map(|(binding, ty)| {
        quote! { let #binding = args.next::<#ty>()?; }
    });

    let (rest_take, rest_arg) = match &method.variadic {
        Some(elem) => (
            quote! { let __rest = args.variadic::<#elem>()?; },
            quote! { __rest },
        ),
        None => (quote! {}, quote! {}),
    };
    let call_args = bindings.iter().map(|binding| quote! { #binding }).chain(
        method.variadic.as_ref().map(|_| rest_arg.clone()),
    );

    let call = quote! { self.#ident(#(#call_args),*) };
    let returns = match method.fallible {
        true => quote! { ::introspect::into_fallible_returns(#call) },
        false => quote! { ::core::result::Result::Ok(::introspect::into_returns(#call)) },
    };

    quote! {
        #name => ::core::option::Option::Some((|| -> ::introspect::CallResult {
            args.check(#fixed, #is_variadic)?;
            #(#takes)*
            #rest_take
            #returns
        })()),
    }
}

pub fn expand(mut item: syn::ItemImpl) -> syn::Result<proc_macro2::TokenStream> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(path, "#[methods] works on inherent impl blocks only"));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "#[methods] for generic types is currently not supported",
        ));
    }

    let mut methods = Vec::new();
    for impl_item in item.items.iter_mut() {
        let syn::ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let attrs = take_method_attrs(method)?;
        if let Some(method) = collect_method(method, &attrs)? {
            methods.push(method);
        }
    }

    let self_ty = &item.self_ty;
    let infos = methods.iter().map(create_method_info);
    let ref_arms = methods
        .iter()
        .filter(|method| method.receiver == Receiver::Ref)
        .map(create_dispatch_arm);
    let all_arms = methods.iter().map(create_dispatch_arm);

    Ok(quote! {
        #item

        #[automatically_derived]
        impl ::introspect::Methods for #self_ty {
            fn method_infos(&self) -> &'static [::introspect::MethodInfo] {
                const METHODS: &[::introspect::MethodInfo] = &[#(#infos),*];
                METHODS
            }

            #[allow(unused_variables, unused_mut)]
            fn dispatch(
                &self,
                name: &str,
                args: &mut ::introspect::Args,
            ) -> ::core::option::Option<::introspect::CallResult> {
                match name {
                    #(#ref_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(unused_variables, unused_mut)]
            fn dispatch_mut(
                &mut self,
                name: &str,
                args: &mut ::introspect::Args,
            ) -> ::core::option::Option<::introspect::CallResult> {
                match name {
                    #(#all_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}
