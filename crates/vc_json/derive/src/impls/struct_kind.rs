use proc_macro2::TokenStream;
use quote::quote;
use syn::LitStr;

use crate::derive_data::{ContractField, ContractInput};
use crate::utils::pascal_case;

/// Generate `Data`, `Object`, `Decode` and `Contract` for a struct.
pub(crate) fn impl_struct(input: &ContractInput, fields: &[ContractField]) -> TokenStream {
    let vc_json = input.vc_json_path();
    let data_ = crate::path::data_(vc_json);
    let data_ref_ = crate::path::data_ref_(vc_json);
    let object_ = crate::path::object_(vc_json);
    let decode_ = crate::path::decode_(vc_json);
    let contract_ = crate::path::contract_(vc_json);
    let node_ = crate::path::node_(vc_json);
    let decoder_ = crate::path::decoder_(vc_json);
    let result_ = crate::path::result_(vc_json);
    let info_ = crate::path::info_(vc_json);

    let type_info_tokens = type_info_tokens(input, fields);

    let cell_tokens = if input.impl_with_generic() {
        quote! {
            static CELL: #info_::GenericTypeInfoCell = #info_::GenericTypeInfoCell::new();
            CELL.get_or_insert::<Self>(|| #type_info_tokens)
        }
    } else {
        quote! {
            static CELL: #info_::TypeInfoCell = #info_::TypeInfoCell::new();
            CELL.get_or_init(|| #type_info_tokens)
        }
    };

    let ident = input.ident();
    let (impl_generics, ty_generics, where_clause) = input.split_generics();

    quote! {
        impl #impl_generics #data_ for #ident #ty_generics #where_clause {
            #[inline]
            fn data_ref(&self) -> #data_ref_<'_> {
                #data_ref_::Object(self)
            }
        }

        impl #impl_generics #object_ for #ident #ty_generics #where_clause {
            #[inline]
            fn object_info(&self) -> &'static #info_::TypeInfo {
                <Self as #contract_>::type_info()
            }
        }

        impl #impl_generics #decode_ for #ident #ty_generics #where_clause {
            #[inline]
            fn decode(node: &#node_, de: &mut #decoder_<'_>) -> #result_<Self> {
                de.materialize::<Self>(node)
            }
        }

        impl #impl_generics #contract_ for #ident #ty_generics #where_clause {
            fn type_info() -> &'static #info_::TypeInfo {
                #cell_tokens
            }
        }
    }
}

fn type_info_tokens(input: &ContractInput, fields: &[ContractField]) -> TokenStream {
    let vc_json = input.vc_json_path();
    let info_ = crate::path::info_(vc_json);
    let exports_ = crate::path::macro_exports_(vc_json);

    let discriminator = input.discriminator();
    let members = fields.iter().map(|field| member_tokens(input, field));

    let constructors = input.attrs().constructors.iter().map(|decl| {
        let func = &decl.func;
        let arity = decl.params.len();
        let params = decl
            .params
            .iter()
            .map(|param| LitStr::new(&pascal_case(&param.to_string()), param.span()));
        let args = decl.params.iter().map(|_| quote!(args.next()?));
        let binding = if arity == 0 {
            quote!(let _ = )
        } else {
            quote!(let mut args = )
        };

        quote! {
            .with_constructor(#info_::ConstructorInfo::new(
                &[#(#params),*],
                |args| {
                    #binding #exports_::Args::new(args, #arity, ::core::any::type_name::<Self>())?;
                    ::core::result::Result::Ok(#exports_::erase(Self::#func(#(#args),*)))
                },
            ))
        }
    });

    let default = input.attrs().default.map(|span| {
        quote::quote_spanned! { span =>
            .with_default(|| #exports_::erase(<Self as ::core::default::Default>::default()))
        }
    });

    quote! {
        #info_::TypeInfo::new::<Self>(#discriminator)
            #(.with_member(#members))*
            #(#constructors)*
            #default
    }
}

fn member_tokens(input: &ContractInput, field: &ContractField) -> TokenStream {
    let vc_json = input.vc_json_path();
    let info_ = crate::path::info_(vc_json);
    let data_ = crate::path::data_(vc_json);
    let exports_ = crate::path::macro_exports_(vc_json);

    let ident = field.ident;
    let ty = field.ty;
    let name = LitStr::new(&field.name, ident.span());
    let attrs = &field.attrs;

    let getter = quote! {
        |instance| {
            #exports_::downcast_ref::<Self>(instance).map(|this| &this.#ident as &dyn #data_)
        }
    };

    let constructor = match &attrs.adapter {
        Some(adapter) => quote! { #info_::MemberInfo::adapted::<#ty, #adapter>(#name, #getter) },
        None => quote! { #info_::MemberInfo::new::<#ty>(#name, #getter) },
    };

    let setter = (!attrs.readonly).then(|| {
        quote! {
            .with_setter(|instance, value| {
                #exports_::downcast_mut::<Self>(instance)?.#ident = #exports_::take(value)?;
                ::core::result::Result::Ok(())
            })
        }
    });

    let rename = attrs.rename.as_ref().map(|lit| quote!(.rename(#lit)));
    let ignored = attrs.ignore.then(|| quote!(.ignored()));
    let required = attrs.required.then(|| quote!(.required()));
    let order = attrs.order.as_ref().map(|expr| quote!(.order(#expr)));
    let binder = attrs.binder.as_ref().map(|path| quote!(.binder::<#path>()));

    quote! {
        #constructor
            #setter
            .with_attributes(
                #info_::MemberAttributes::new()
                    #rename
                    #ignored
                    #required
                    #order
                    #binder
            )
    }
}
