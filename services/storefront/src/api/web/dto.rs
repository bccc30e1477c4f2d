use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::OrderStatus;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CustomerReqDto {
    pub nome: String,
    pub telefone: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OrderMetaReqDto {
    // the client may send its own total, it is never trusted
    pub total: Option<Decimal>,
    #[serde(default)]
    pub taxa_entrega: Decimal,
    pub metodo_pagamento: String,
    // ignored, new orders always start at pending
    pub status: Option<String>,
    pub entrega: bool,
    pub rua: Option<String>,
    pub numero: Option<String>,
    pub bairro: Option<String>,
    pub observacoes: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OrderLineReqDto {
    pub produto_id: u32,
    pub quantidade: i32,
    pub preco_unitario: Decimal,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OrderCreateReqData {
    pub cliente: CustomerReqDto,
    pub pedido: OrderMetaReqDto,
    pub itens: Vec<OrderLineReqDto>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorReason {
    Empty,
    Negative,
    NotPositive,
    NonZero,
    NotExist,
    Inactive,
    Duplicate,
    ExceedLimit,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct CustomerErrorDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefone: Option<FieldErrorReason>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct DeliveryErrorDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rua: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numero: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bairro: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxa_entrega: Option<FieldErrorReason>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct OrderLineErrorDto {
    pub produto_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub produto: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantidade: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preco_unitario: Option<FieldErrorReason>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct OrderLinesErrorDto {
    // problem of the line collection as a whole, e.g. empty cart
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geral: Option<FieldErrorReason>,
    pub linhas: Vec<OrderLineErrorDto>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct OrderCreateRespErrorDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cliente: Option<CustomerErrorDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrega: Option<DeliveryErrorDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metodo_pagamento: Option<FieldErrorReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itens: Option<OrderLinesErrorDto>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CustomerDto {
    pub id: u32,
    pub nome: String,
    pub telefone: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OrderLineDto {
    pub id: u32,
    pub produto_id: u32,
    pub produto_nome: String,
    pub quantidade: u32,
    pub preco_unitario: Decimal,
    pub total: Decimal,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OrderDto {
    pub id: u32,
    pub cliente: CustomerDto,
    pub subtotal: Decimal,
    pub taxa_entrega: Decimal,
    pub total: Decimal,
    pub metodo_pagamento: String,
    pub status: OrderStatus,
    pub entrega: bool,
    pub rua: Option<String>,
    pub numero: Option<String>,
    pub bairro: Option<String>,
    pub observacoes: Option<String>,
    pub created_at: String,
    pub itens: Vec<OrderLineDto>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NotifyLinkDto {
    pub link: String,
    pub mensagem: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct OrderCreateRespOkDto {
    pub success: bool,
    pub pedido: OrderDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<NotifyLinkDto>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct OrderNotifyRespDto {
    pub success: bool,
    pub whatsapp: NotifyLinkDto,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct OrderStatusReqDto {
    pub status: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct OrderListQueryDto {
    pub status: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CategoryDto {
    pub id: u32,
    pub nome: String,
    pub ativo: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ProductDto {
    pub id: u32,
    pub nome: String,
    pub descricao: Option<String>,
    pub preco: Decimal,
    pub imagem_url: Option<String>,
    pub categoria_id: Option<u32>,
    pub ativo: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NeighborhoodDto {
    pub id: u32,
    pub nome: String,
    pub taxa: Decimal,
    pub ativo: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PayMethodDto {
    pub id: u32,
    pub nome: String,
    pub valor: String,
    pub ativo: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BannerDto {
    pub id: u32,
    pub titulo: String,
    pub imagem_url: String,
    pub ordem: i32,
    pub ativo: bool,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CatalogRespDto {
    pub categorias: Vec<CategoryDto>,
    pub produtos: Vec<ProductDto>,
    pub bairros: Vec<NeighborhoodDto>,
    pub metodos_pagamento: Vec<PayMethodDto>,
    pub banners: Vec<BannerDto>,
}

// path segment selecting the kind of catalog entry
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CatalogEntityDto {
    Categoria,
    Produto,
    Bairro,
    MetodoPagamento,
    Banner,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum CatalogItemDto {
    Categoria(CategoryDto),
    Produto(ProductDto),
    Bairro(NeighborhoodDto),
    MetodoPagamento(PayMethodDto),
    Banner(BannerDto),
}

#[derive(Deserialize, Debug, Default)]
pub struct CatalogQueryDto {
    pub categoria_id: Option<u32>,
    // admin panel lists deactivated entries as well
    #[serde(default)]
    pub inativos: bool,
}

fn default_active() -> bool {
    true
}

/// One administrative change to the catalog, each variant carries only the
/// fields valid for its entity and operation.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(tag = "comando", rename_all = "snake_case")]
pub enum CatalogEditReqDto {
    CriarCategoria {
        nome: String,
        #[serde(default = "default_active")]
        ativo: bool,
    },
    AtualizarCategoria {
        id: u32,
        nome: String,
        ativo: bool,
    },
    ExcluirCategoria {
        id: u32,
    },
    CriarProduto {
        nome: String,
        descricao: Option<String>,
        preco: Decimal,
        imagem_url: Option<String>,
        categoria_id: Option<u32>,
        #[serde(default = "default_active")]
        ativo: bool,
    },
    AtualizarProduto {
        id: u32,
        nome: String,
        descricao: Option<String>,
        preco: Decimal,
        imagem_url: Option<String>,
        categoria_id: Option<u32>,
        ativo: bool,
    },
    ExcluirProduto {
        id: u32,
    },
    CriarBairro {
        nome: String,
        taxa: Decimal,
        #[serde(default = "default_active")]
        ativo: bool,
    },
    AtualizarBairro {
        id: u32,
        nome: String,
        taxa: Decimal,
        ativo: bool,
    },
    ExcluirBairro {
        id: u32,
    },
    CriarMetodoPagamento {
        nome: String,
        valor: String,
        #[serde(default = "default_active")]
        ativo: bool,
    },
    AtualizarMetodoPagamento {
        id: u32,
        nome: String,
        valor: String,
        ativo: bool,
    },
    ExcluirMetodoPagamento {
        id: u32,
    },
    CriarBanner {
        titulo: String,
        imagem_url: String,
        #[serde(default)]
        ordem: i32,
        #[serde(default = "default_active")]
        ativo: bool,
    },
    AtualizarBanner {
        id: u32,
        titulo: String,
        imagem_url: String,
        ordem: i32,
        ativo: bool,
    },
    ExcluirBanner {
        id: u32,
    },
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CatalogEditErrorDto {
    pub campo: String,
    pub motivo: FieldErrorReason,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CatalogEditRespDto {
    pub success: bool,
    pub id: u32,
}
