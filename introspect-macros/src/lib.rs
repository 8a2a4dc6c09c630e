use proc_macro::TokenStream;
use quote::{format_ident, quote};

mod methods;

#[derive(Clone, PartialEq, Eq)]
enum FieldId {
    Named(syn::Ident),
    Index(syn::Index),
}

struct Field {
    id: FieldId,
    ty: syn::Type,
    public: bool,
    flatten: bool,
    tags: Vec<(String, String)>,
}

impl Field {
    /// Identifier the field is bound to when destructuring
    fn binding(&self) -> syn::Ident {
        match &self.id {
            FieldId::Named(name) => format_ident!("__field_{}", name),
            FieldId::Index(index) => format_ident!("__field_{}", index.index),
        }
    }

    fn position(&self, fallback: usize) -> usize {
        match &self.id {
            FieldId::Index(index) => index.index as usize,
            FieldId::Named(_) => fallback,
        }
    }
}

enum Fields {
    Named(Vec<Field>),
    Indexed(Vec<Field>),
    Unit,
}

impl Fields {
    fn iter(&self) -> std::slice::Iter<'_, Field> {
        match self {
            Fields::Named(fields) | Fields::Indexed(fields) => fields.iter(),
            Fields::Unit => (&[] as &[Field]).iter(),
        }
    }
}

struct Variant {
    name: syn::Ident,
    fields: Fields,
}

enum Data {
    Struct(Fields),
    Enum(Vec<Variant>),
}

/// `#[introspect(flatten, tag(json = "name"))]` on a field
fn parse_field_attrs(field: &syn::Field) -> syn::Result<(bool, Vec<(String, String)>)> {
    let mut flatten = false;
    let mut tags = Vec::new();

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("introspect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("flatten") {
                flatten = true;
                return Ok(());
            }

            if meta.path.is_ident("tag") {
                return meta.parse_nested_meta(|tag| {
                    let key = tag
                        .path
                        .get_ident()
                        .ok_or_else(|| tag.error("tag key must be an identifier"))?
                        .to_string();
                    let value: syn::LitStr = tag.value()?.parse()?;
                    tags.push((key, value.value()));
                    Ok(())
                });
            }

            Err(meta.error("unsupported introspect field attribute, expected `flatten` or `tag(..)`"))
        })?;
    }

    Ok((flatten, tags))
}

/// `#[introspect(implements(Trait, path::Trait))]` on a type
fn parse_type_attrs(input: &syn::DeriveInput) -> syn::Result<Vec<syn::Path>> {
    let mut traits = Vec::new();

    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("introspect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("implements") {
                let content;
                syn::parenthesized!(content in meta.input);
                let paths = content.parse_terminated(syn::Path::parse_mod_style, syn::Token![,])?;
                traits.extend(paths);
                return Ok(());
            }

            Err(meta.error("unsupported introspect type attribute, expected `implements(..)`"))
        })?;
    }

    Ok(traits)
}

fn create_meta_fields(fields: &syn::Fields, inherit_public: bool) -> syn::Result<Fields> {
    let mut new_fields = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let id = match field.ident.as_ref() {
            Some(name) => FieldId::Named(name.clone()),
            None => FieldId::Index(syn::Index::from(index)),
        };
        let (flatten, tags) = parse_field_attrs(field)?;

        new_fields.push(Field {
            id,
            ty: field.ty.clone(),
            public: inherit_public || matches!(field.vis, syn::Visibility::Public(_)),
            flatten,
            tags,
        });
    }

    Ok(match fields {
        syn::Fields::Named(_) => Fields::Named(new_fields),
        syn::Fields::Unnamed(_) => Fields::Indexed(new_fields),
        syn::Fields::Unit => Fields::Unit,
    })
}

struct MetaType {
    ident: syn::Ident,
    info_ident: syn::Ident,
    data: Data,
    traits: Vec<syn::Path>,
}

impl MetaType {
    pub fn new(input: &syn::DeriveInput) -> syn::Result<Self> {
        let ident = input.ident.clone();

        if !input.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &input.generics,
                "TypeInfo for generic types is currently not supported",
            ));
        }

        let data = match &input.data {
            syn::Data::Struct(data) => Data::Struct(create_meta_fields(&data.fields, false)?),
            syn::Data::Enum(data) => {
                if data.variants.is_empty() {
                    return Err(syn::Error::new_spanned(
                        &input.ident,
                        "TypeInfo requires at least one variant to have a zero value",
                    ));
                }

                let mut variants = Vec::new();
                for variant in data.variants.iter() {
                    variants.push(Variant {
                        name: variant.ident.clone(),
                        // variant fields share visibility of the enum
                        fields: create_meta_fields(&variant.fields, true)?,
                    });
                }
                Data::Enum(variants)
            }
            syn::Data::Union(_) => {
                return Err(syn::Error::new_spanned(&input.ident, "Unions are not supported"));
            }
        };

        let info_ident = format_ident!("{}_TYPE_INFO", ident.to_string().to_ascii_uppercase());

        Ok(Self {
            ident,
            info_ident,
            data,
            traits: parse_type_attrs(input)?,
        })
    }
}

mod gen {
    use quote::quote;

    use super::{Data, FieldId, Fields, MetaType, Variant};

    fn collect_fields(fields: &Fields) -> proc_macro2::TokenStream {
        let definitions = fields.iter().map(|field| {
            let id = match &field.id {
                FieldId::Named(ident) => {
                    let name = ident.to_string();
                    quote! { ::introspect::FieldId::Named(#name) }
                }
                FieldId::Index(index) => {
                    let index = index.index as usize;
                    quote! { ::introspect::FieldId::Index(#index) }
                }
            };
            let ty = &field.ty;
            let public = field.public;
            let flatten = field.flatten;
            let tags = field.tags.iter().map(|(key, value)| {
                quote! { ::introspect::Tag { key: #key, value: #value } }
            });

            quote! {
                ::introspect::Field {
                    id: #id,
                    ty: ::introspect::type_info::<#ty>,
                    public: #public,
                    flatten: #flatten,
                    tags: &[#(#tags),*],
                }
            }
        });

        match fields {
            Fields::Named(_) => quote! { ::introspect::Fields::Named(&[#(#definitions),*]) },
            Fields::Indexed(_) => quote! { ::introspect::Fields::Indexed(&[#(#definitions),*]) },
            Fields::Unit => quote! { ::introspect::Fields::Unit },
        }
    }

    fn collect_variants(variants: &[Variant]) -> proc_macro2::TokenStream {
        let definitions = variants.iter().map(|variant| {
            let ident = variant.name.to_string();
            let fields = collect_fields(&variant.fields);
            quote! {
                ::introspect::Variant {
                    ident: #ident,
                    fields: #fields,
                }
            }
        });

        quote! {
            ::introspect::Variants { variants: &[#(#definitions),*] }
        }
    }

    pub fn create_const_definition(meta: &MetaType) -> proc_macro2::TokenStream {
        let (kind, data) = match &meta.data {
            Data::Struct(fields) => {
                let fields = collect_fields(fields);
                (quote! { Struct }, quote! { ::introspect::Data::Struct(#fields) })
            }
            Data::Enum(variants) => {
                let variants = collect_variants(variants);
                (quote! { Enum }, quote! { ::introspect::Data::Enum(#variants) })
            }
        };

        let traits = meta.traits.iter().map(|path| {
            let name = path
                .segments
                .last()
                .map(|segment| segment.ident.to_string())
                .unwrap_or_default();
            quote! {
                ::introspect::TraitInfo {
                    name: #name,
                    type_id: ::core::any::TypeId::of::<dyn #path>,
                }
            }
        });

        let const_ident = &meta.info_ident;
        let ty = &meta.ident;
        let ty_ident = meta.ident.to_string();

        quote! {
            const #const_ident: ::introspect::Type = ::introspect::Type {
                ident: #ty_ident,
                module: ::core::module_path!(),
                kind: ::introspect::Kind::#kind,
                data: #data,
                traits: &[#(#traits),*],
                type_id: ::core::any::TypeId::of::<#ty>,
                type_name: ::core::any::type_name::<#ty>,
                zeroed: ::introspect::zeroed_dyn::<#ty>,
            };
        }
    }

    /// Compile-time proof that the type implements every trait it declares
    pub fn create_implements_assertions(meta: &MetaType) -> proc_macro2::TokenStream {
        let ty = &meta.ident;
        let assertions = meta.traits.iter().map(|path| {
            quote! {
                const _: fn() = || {
                    fn assert_implements<T: ?Sized + #path>() {}
                    assert_implements::<#ty>();
                };
            }
        });
        quote! { #(#assertions)* }
    }

    fn field_patterns(field: &super::Field, position: usize) -> proc_macro2::TokenStream {
        let index = field.position(position);
        match &field.id {
            FieldId::Named(ident) => {
                let name = ident.to_string();
                quote! { ::introspect::FieldId::Named(#name) | ::introspect::FieldId::Index(#index) }
            }
            FieldId::Index(_) => quote! { ::introspect::FieldId::Index(#index) },
        }
    }

    fn trait_object(is_mut: bool) -> proc_macro2::TokenStream {
        match is_mut {
            true => quote! { &mut dyn ::introspect::TypeInfoDynamic },
            false => quote! { &dyn ::introspect::TypeInfoDynamic },
        }
    }

    // fields of a struct, accessed through `self`
    fn create_dyn_field_access_match(fields: &Fields, is_mut: bool) -> proc_macro2::TokenStream {
        let object = trait_object(is_mut);
        let ref_type = match is_mut {
            true => quote! { &mut },
            false => quote! { & },
        };

        let arms = fields.iter().enumerate().map(|(position, field)| {
            let pattern = field_patterns(field, position);
            let member = match &field.id {
                FieldId::Named(ident) => quote! { #ident },
                FieldId::Index(index) => quote! { #index },
            };
            quote! {
                #pattern => ::core::result::Result::Ok(#ref_type self.#member as #object),
            }
        });

        match fields {
            Fields::Unit => quote! {
                let _ = id;
                ::core::result::Result::Err(::introspect::FieldAccessError::Unit)
            },
            _ => quote! {
                match id {
                    #(#arms)*
                    _ => ::core::result::Result::Err(::introspect::FieldAccessError::NotFound),
                }
            },
        }
    }

    // fields of the active variant, bound by destructuring
    fn create_dyn_variant_access_match(variants: &[Variant], is_mut: bool) -> proc_macro2::TokenStream {
        let object = trait_object(is_mut);
        let inplace_ref_type = match is_mut {
            true => quote! { ref mut },
            false => quote! { ref },
        };

        let arms = variants.iter().map(|variant| {
            let variant_name = &variant.name;

            let pattern = match &variant.fields {
                Fields::Named(named) => {
                    let bindings = named.iter().map(|field| {
                        let FieldId::Named(ident) = &field.id else {
                            unreachable!()
                        };
                        let binding = field.binding();
                        quote! { #ident: #inplace_ref_type #binding }
                    });
                    quote! { Self::#variant_name { #(#bindings),* } }
                }
                Fields::Indexed(indexed) => {
                    let bindings = indexed.iter().map(|field| {
                        let binding = field.binding();
                        quote! { #inplace_ref_type #binding }
                    });
                    quote! { Self::#variant_name(#(#bindings),*) }
                }
                Fields::Unit => quote! { Self::#variant_name },
            };

            let body = match &variant.fields {
                Fields::Unit => quote! {
                    ::core::result::Result::Err(::introspect::FieldAccessError::Unit)
                },
                fields => {
                    let field_arms = fields.iter().enumerate().map(|(position, field)| {
                        let field_pattern = field_patterns(field, position);
                        let binding = field.binding();
                        quote! {
                            #field_pattern => ::core::result::Result::Ok(#binding as #object),
                        }
                    });
                    quote! {
                        match id {
                            #(#field_arms)*
                            _ => ::core::result::Result::Err(::introspect::FieldAccessError::NotFound),
                        }
                    }
                }
            };

            quote! { #pattern => { #body } }
        });

        quote! {
            let _ = id;
            match *self {
                #(#arms)*
            }
        }
    }

    pub fn create_get_dyn_field_method_body(meta: &MetaType, is_mut: bool) -> proc_macro2::TokenStream {
        match &meta.data {
            Data::Struct(fields) => create_dyn_field_access_match(fields, is_mut),
            Data::Enum(variants) => create_dyn_variant_access_match(variants, is_mut),
        }
    }

    /// Builds `ty_path` out of zero values of its fields
    fn create_zeroed_expr(ty_path: &proc_macro2::TokenStream, fields: &Fields) -> proc_macro2::TokenStream {
        let zeroes = fields.iter().map(|field| {
            let ty = &field.ty;
            let value = quote! { <#ty as ::introspect::TypeInfo>::zeroed() };
            match &field.id {
                FieldId::Named(ident) => quote! { #ident: #value },
                FieldId::Index(_) => value,
            }
        });

        match fields {
            Fields::Named(_) => quote! { #ty_path { #(#zeroes),* } },
            Fields::Indexed(_) => quote! { #ty_path(#(#zeroes),*) },
            Fields::Unit => quote! { #ty_path },
        }
    }

    /// Zero value: every field zeroed, enums take their first variant
    pub fn create_zeroed_body(meta: &MetaType) -> proc_macro2::TokenStream {
        match &meta.data {
            Data::Struct(fields) => create_zeroed_expr(&quote! { Self }, fields),
            Data::Enum(variants) => {
                // MetaType::new rejects enums without variants
                let first = &variants[0];
                let name = &first.name;
                create_zeroed_expr(&quote! { Self::#name }, &first.fields)
            }
        }
    }

    /*
    Takes field values out of erased arguments, in definition order

    Every argument is downcast to the type of its field and moved out of its box;
    the first mismatch reports its position and the expected type
    */
    fn create_dyn_fields_ctor_body(ty_path: &proc_macro2::TokenStream, fields: &Fields) -> proc_macro2::TokenStream {
        let downcast_stmts = fields.iter().enumerate().map(|(index, field)| {
            let binding = field.binding();
            let ty = &field.ty;
            quote! {
                let #binding = *args
                    .next()
                    .ok_or(::introspect::RuntimeConstructError::NotEnoughArgs)?
                    .downcast::<#ty>()
                    .map_err(|_| ::introspect::RuntimeConstructError::UnexpectedType {
                        index: #index,
                        expected: ::core::any::type_name::<#ty>(),
                    })?;
            }
        });

        let values = fields.iter().map(|field| {
            let binding = field.binding();
            match &field.id {
                FieldId::Named(ident) => quote! { #ident: #binding },
                FieldId::Index(_) => quote! { #binding },
            }
        });

        let value = match fields {
            Fields::Named(_) => quote! { #ty_path { #(#values),* } },
            Fields::Indexed(_) => quote! { #ty_path(#(#values),*) },
            Fields::Unit => quote! { #ty_path },
        };

        quote! {
            let mut args = args.into_iter();
            #(#downcast_stmts)*
            if args.next().is_some() {
                return ::core::result::Result::Err(::introspect::RuntimeConstructError::TooManyArgs);
            }
            ::core::result::Result::Ok(::std::boxed::Box::new(#value))
        }
    }

    pub fn create_dyn_struct_ctor(meta: &MetaType) -> proc_macro2::TokenStream {
        let body = match &meta.data {
            Data::Struct(fields) => create_dyn_fields_ctor_body(&quote! { Self }, fields),
            Data::Enum(_) => quote! {
                let _ = args;
                ::core::result::Result::Err(::introspect::RuntimeConstructError::NotStruct)
            },
        };

        quote! {
            fn construct_struct(
                &self,
                args: ::std::vec::Vec<::std::boxed::Box<dyn ::core::any::Any>>,
            ) -> ::core::result::Result<::std::boxed::Box<dyn ::core::any::Any>, ::introspect::RuntimeConstructError> {
                #body
            }
        }
    }

    pub fn create_dyn_enum_ctor(meta: &MetaType) -> proc_macro2::TokenStream {
        let body = match &meta.data {
            Data::Struct(_) => quote! {
                let _ = (variant, args);
                ::core::result::Result::Err(::introspect::RuntimeConstructError::NotEnum)
            },
            Data::Enum(variants) => {
                let arms = variants.iter().map(|variant| {
                    let name = &variant.name;
                    let name_str = name.to_string();
                    let body = create_dyn_fields_ctor_body(&quote! { Self::#name }, &variant.fields);
                    quote! { #name_str => { #body } }
                });

                quote! {
                    match variant {
                        #(#arms)*
                        _ => ::core::result::Result::Err(::introspect::RuntimeConstructError::InvalidVariant),
                    }
                }
            }
        };

        quote! {
            fn construct_enum(
                &self,
                variant: &str,
                args: ::std::vec::Vec<::std::boxed::Box<dyn ::core::any::Any>>,
            ) -> ::core::result::Result<::std::boxed::Box<dyn ::core::any::Any>, ::introspect::RuntimeConstructError> {
                #body
            }
        }
    }

    pub fn create_variant_method(meta: &MetaType) -> proc_macro2::TokenStream {
        let Data::Enum(variants) = &meta.data else {
            return quote! {};
        };

        let arms = variants.iter().map(|variant| {
            let name = &variant.name;
            let name_str = name.to_string();
            quote! { Self::#name { .. } => ::core::option::Option::Some(#name_str), }
        });

        quote! {
            fn variant(&self) -> ::core::option::Option<&'static str> {
                match *self {
                    #(#arms)*
                }
            }
        }
    }
}

fn expand_type_info(ast: &syn::DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let meta = MetaType::new(ast)?;

    let const_definition = gen::create_const_definition(&meta);
    let assertions = gen::create_implements_assertions(&meta);

    let const_def_ident = &meta.info_ident;
    let ty_ident = &meta.ident;

    let struct_ctor = gen::create_dyn_struct_ctor(&meta);
    let enum_ctor = gen::create_dyn_enum_ctor(&meta);
    let variant_method = gen::create_variant_method(&meta);
    let zeroed_body = gen::create_zeroed_body(&meta);

    let mut_field_access_body = gen::create_get_dyn_field_method_body(&meta, true);
    let field_access_body = gen::create_get_dyn_field_method_body(&meta, false);

    Ok(quote! {
        const _: () = {
            #const_definition

            #[automatically_derived]
            impl ::introspect::TypeInfoDynamic for #ty_ident {
                fn get_dynamic(&self) -> &'static ::introspect::Type {
                    <Self as ::introspect::TypeInfo>::INFO
                }

                fn as_any(&self) -> &dyn ::core::any::Any {
                    self
                }

                fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                    self
                }

                fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::core::any::Any> {
                    self
                }

                #struct_ctor
                #enum_ctor

                fn field(
                    &self,
                    id: ::introspect::FieldId<'_>,
                ) -> ::core::result::Result<&dyn ::introspect::TypeInfoDynamic, ::introspect::FieldAccessError> {
                    #field_access_body
                }

                fn field_mut(
                    &mut self,
                    id: ::introspect::FieldId<'_>,
                ) -> ::core::result::Result<&mut dyn ::introspect::TypeInfoDynamic, ::introspect::FieldAccessError> {
                    #mut_field_access_body
                }

                fn pointee(&self) -> ::introspect::Pointee<'_> {
                    ::introspect::Pointee::NotPointer
                }

                fn pointee_mut(&mut self, _allocate: bool) -> ::introspect::PointeeMut<'_> {
                    ::introspect::PointeeMut::NotPointer
                }

                fn assign(
                    &mut self,
                    value: ::std::boxed::Box<dyn ::core::any::Any>,
                ) -> ::core::result::Result<(), ::introspect::AssignError> {
                    ::introspect::assign_exact(self, value)
                }

                #variant_method
            }

            #[automatically_derived]
            impl ::introspect::TypeInfo for #ty_ident {
                const INFO: &'static ::introspect::Type = &#const_def_ident;

                fn zeroed() -> Self {
                    #zeroed_body
                }
            }

            #assertions
        };
    })
}

/// Derives `TypeInfo` and `TypeInfoDynamic`
///
/// Field types must implement `TypeInfo` themselves
#[proc_macro_derive(TypeInfo, attributes(introspect))]
pub fn type_info_derive(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    expand_type_info(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Registers public `&self`/`&mut self` methods of an inherent impl block for calls by name
#[proc_macro_attribute]
pub fn methods(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[methods] doesn't take arguments",
        )
        .into_compile_error()
        .into();
    }

    let item = syn::parse_macro_input!(item as syn::ItemImpl);
    methods::expand(item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
