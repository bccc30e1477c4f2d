use std::result::Result as DefaultResult;

use rust_decimal::Decimal;

use crate::api::web::dto::{
    BannerDto, CatalogEditErrorDto, CatalogEditReqDto, CatalogEntityDto, CatalogItemDto,
    CatalogRespDto, CategoryDto, FieldErrorReason, NeighborhoodDto, PayMethodDto, ProductDto,
};

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryModel {
    pub id: u32,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductModel {
    pub id: u32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category_id: Option<u32>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodModel {
    pub id: u32,
    pub name: String,
    pub fee: Decimal,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayMethodModel {
    pub id: u32,
    pub name: String,
    // identifier carried by orders, e.g. `pix`, `cartao`
    pub value: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BannerModel {
    pub id: u32,
    pub title: String,
    pub image_url: String,
    // lower value shows up first in the storefront carousel
    pub position: i32,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogItemKind {
    Category,
    Product,
    Neighborhood,
    PayMethod,
    Banner,
}

/// Single catalog entry loaded by its identifier
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogItemModel {
    Category(CategoryModel),
    Product(ProductModel),
    Neighborhood(NeighborhoodModel),
    PayMethod(PayMethodModel),
    Banner(BannerModel),
}

#[derive(Debug, Clone, Default)]
pub struct NeighborhoodModelSet(pub Vec<NeighborhoodModel>);

impl NeighborhoodModelSet {
    pub fn find(&self, id: u32) -> Option<&NeighborhoodModel> {
        self.0.iter().find(|n| n.id == id)
    }

    /// Flat fee of the selected neighborhood, zero when nothing is selected or
    /// the selection does not exist
    pub fn delivery_fee(&self, selected: Option<u32>) -> Decimal {
        selected
            .and_then(|id| self.find(id))
            .map(|n| n.fee)
            .unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Default)]
pub struct CatalogModelSet {
    pub categories: Vec<CategoryModel>,
    pub products: Vec<ProductModel>,
    pub neighborhoods: NeighborhoodModelSet,
    pub pay_methods: Vec<PayMethodModel>,
    pub banners: Vec<BannerModel>,
}

impl CatalogModelSet {
    pub fn visible(self, include_inactive: bool, category: Option<u32>) -> Self {
        let Self {
            mut categories,
            mut products,
            neighborhoods,
            mut pay_methods,
            mut banners,
        } = self;
        let mut neighborhoods = neighborhoods.0;
        if !include_inactive {
            categories.retain(|c| c.active);
            products.retain(|p| p.active);
            neighborhoods.retain(|n| n.active);
            pay_methods.retain(|m| m.active);
            banners.retain(|b| b.active);
        }
        if let Some(cid) = category {
            products.retain(|p| p.category_id == Some(cid));
        }
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        products.sort_by(|a, b| a.name.cmp(&b.name));
        neighborhoods.sort_by(|a, b| a.name.cmp(&b.name));
        pay_methods.sort_by(|a, b| a.name.cmp(&b.name));
        banners.sort_by_key(|b| (b.position, b.id));
        Self {
            categories,
            products,
            neighborhoods: NeighborhoodModelSet(neighborhoods),
            pay_methods,
            banners,
        }
    }
} // end of impl CatalogModelSet

impl From<CatalogEntityDto> for CatalogItemKind {
    fn from(value: CatalogEntityDto) -> Self {
        match value {
            CatalogEntityDto::Categoria => Self::Category,
            CatalogEntityDto::Produto => Self::Product,
            CatalogEntityDto::Bairro => Self::Neighborhood,
            CatalogEntityDto::MetodoPagamento => Self::PayMethod,
            CatalogEntityDto::Banner => Self::Banner,
        }
    }
}

impl From<CategoryModel> for CategoryDto {
    fn from(value: CategoryModel) -> Self {
        Self {
            id: value.id,
            nome: value.name,
            ativo: value.active,
        }
    }
}
impl From<ProductModel> for ProductDto {
    fn from(value: ProductModel) -> Self {
        Self {
            id: value.id,
            nome: value.name,
            descricao: value.description,
            preco: value.price,
            imagem_url: value.image_url,
            categoria_id: value.category_id,
            ativo: value.active,
        }
    }
}
impl From<NeighborhoodModel> for NeighborhoodDto {
    fn from(value: NeighborhoodModel) -> Self {
        Self {
            id: value.id,
            nome: value.name,
            taxa: value.fee,
            ativo: value.active,
        }
    }
}
impl From<PayMethodModel> for PayMethodDto {
    fn from(value: PayMethodModel) -> Self {
        Self {
            id: value.id,
            nome: value.name,
            valor: value.value,
            ativo: value.active,
        }
    }
}
impl From<BannerModel> for BannerDto {
    fn from(value: BannerModel) -> Self {
        Self {
            id: value.id,
            titulo: value.title,
            imagem_url: value.image_url,
            ordem: value.position,
            ativo: value.active,
        }
    }
}
impl From<CatalogItemModel> for CatalogItemDto {
    fn from(value: CatalogItemModel) -> Self {
        match value {
            CatalogItemModel::Category(m) => Self::Categoria(m.into()),
            CatalogItemModel::Product(m) => Self::Produto(m.into()),
            CatalogItemModel::Neighborhood(m) => Self::Bairro(m.into()),
            CatalogItemModel::PayMethod(m) => Self::MetodoPagamento(m.into()),
            CatalogItemModel::Banner(m) => Self::Banner(m.into()),
        }
    }
}
impl From<CatalogModelSet> for CatalogRespDto {
    fn from(value: CatalogModelSet) -> Self {
        Self {
            categorias: value.categories.into_iter().map(CategoryDto::from).collect(),
            produtos: value.products.into_iter().map(ProductDto::from).collect(),
            bairros: value
                .neighborhoods
                .0
                .into_iter()
                .map(NeighborhoodDto::from)
                .collect(),
            metodos_pagamento: value.pay_methods.into_iter().map(PayMethodDto::from).collect(),
            banners: value.banners.into_iter().map(BannerDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryEditModel {
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductEditModel {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category_id: Option<u32>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodEditModel {
    pub name: String,
    pub fee: Decimal,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayMethodEditModel {
    pub name: String,
    pub value: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BannerEditModel {
    pub title: String,
    pub image_url: String,
    pub position: i32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEditCommand {
    CreateCategory(CategoryEditModel),
    UpdateCategory(u32, CategoryEditModel),
    DeleteCategory(u32),
    CreateProduct(ProductEditModel),
    UpdateProduct(u32, ProductEditModel),
    DeleteProduct(u32),
    CreateNeighborhood(NeighborhoodEditModel),
    UpdateNeighborhood(u32, NeighborhoodEditModel),
    DeleteNeighborhood(u32),
    CreatePayMethod(PayMethodEditModel),
    UpdatePayMethod(u32, PayMethodEditModel),
    DeletePayMethod(u32),
    CreateBanner(BannerEditModel),
    UpdateBanner(u32, BannerEditModel),
    DeleteBanner(u32),
}

fn check_name(field: &str, raw: String) -> DefaultResult<String, CatalogEditErrorDto> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(CatalogEditErrorDto {
            campo: field.to_string(),
            motivo: FieldErrorReason::Empty,
        })
    } else {
        Ok(trimmed.to_string())
    }
}

fn check_amount(field: &str, value: Decimal) -> DefaultResult<Decimal, CatalogEditErrorDto> {
    if value < Decimal::ZERO {
        Err(CatalogEditErrorDto {
            campo: field.to_string(),
            motivo: FieldErrorReason::Negative,
        })
    } else {
        Ok(value)
    }
}

fn optional_text(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl TryFrom<CatalogEditReqDto> for CatalogEditCommand {
    type Error = CatalogEditErrorDto;

    fn try_from(value: CatalogEditReqDto) -> DefaultResult<Self, Self::Error> {
        let out = match value {
            CatalogEditReqDto::CriarCategoria { nome, ativo } => {
                let name = check_name("nome", nome)?;
                Self::CreateCategory(CategoryEditModel { name, active: ativo })
            }
            CatalogEditReqDto::AtualizarCategoria { id, nome, ativo } => {
                let name = check_name("nome", nome)?;
                Self::UpdateCategory(id, CategoryEditModel { name, active: ativo })
            }
            CatalogEditReqDto::ExcluirCategoria { id } => Self::DeleteCategory(id),
            CatalogEditReqDto::CriarProduto {
                nome,
                descricao,
                preco,
                imagem_url,
                categoria_id,
                ativo,
            } => Self::CreateProduct(ProductEditModel {
                name: check_name("nome", nome)?,
                description: optional_text(descricao),
                price: check_amount("preco", preco)?,
                image_url: optional_text(imagem_url),
                category_id: categoria_id,
                active: ativo,
            }),
            CatalogEditReqDto::AtualizarProduto {
                id,
                nome,
                descricao,
                preco,
                imagem_url,
                categoria_id,
                ativo,
            } => {
                let data = ProductEditModel {
                    name: check_name("nome", nome)?,
                    description: optional_text(descricao),
                    price: check_amount("preco", preco)?,
                    image_url: optional_text(imagem_url),
                    category_id: categoria_id,
                    active: ativo,
                };
                Self::UpdateProduct(id, data)
            }
            CatalogEditReqDto::ExcluirProduto { id } => Self::DeleteProduct(id),
            CatalogEditReqDto::CriarBairro { nome, taxa, ativo } => {
                Self::CreateNeighborhood(NeighborhoodEditModel {
                    name: check_name("nome", nome)?,
                    fee: check_amount("taxa", taxa)?,
                    active: ativo,
                })
            }
            CatalogEditReqDto::AtualizarBairro {
                id,
                nome,
                taxa,
                ativo,
            } => {
                let data = NeighborhoodEditModel {
                    name: check_name("nome", nome)?,
                    fee: check_amount("taxa", taxa)?,
                    active: ativo,
                };
                Self::UpdateNeighborhood(id, data)
            }
            CatalogEditReqDto::ExcluirBairro { id } => Self::DeleteNeighborhood(id),
            CatalogEditReqDto::CriarMetodoPagamento { nome, valor, ativo } => {
                Self::CreatePayMethod(PayMethodEditModel {
                    name: check_name("nome", nome)?,
                    value: check_name("valor", valor)?,
                    active: ativo,
                })
            }
            CatalogEditReqDto::AtualizarMetodoPagamento {
                id,
                nome,
                valor,
                ativo,
            } => {
                let data = PayMethodEditModel {
                    name: check_name("nome", nome)?,
                    value: check_name("valor", valor)?,
                    active: ativo,
                };
                Self::UpdatePayMethod(id, data)
            }
            CatalogEditReqDto::ExcluirMetodoPagamento { id } => Self::DeletePayMethod(id),
            CatalogEditReqDto::CriarBanner {
                titulo,
                imagem_url,
                ordem,
                ativo,
            } => Self::CreateBanner(BannerEditModel {
                title: check_name("titulo", titulo)?,
                image_url: check_name("imagem_url", imagem_url)?,
                position: ordem,
                active: ativo,
            }),
            CatalogEditReqDto::AtualizarBanner {
                id,
                titulo,
                imagem_url,
                ordem,
                ativo,
            } => {
                let data = BannerEditModel {
                    title: check_name("titulo", titulo)?,
                    image_url: check_name("imagem_url", imagem_url)?,
                    position: ordem,
                    active: ativo,
                };
                Self::UpdateBanner(id, data)
            }
            CatalogEditReqDto::ExcluirBanner { id } => Self::DeleteBanner(id),
        };
        Ok(out)
    } // end of fn try_from
} // end of impl CatalogEditCommand
