//! Company management: the model, its database queries and the route handlers.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;

pub use self::core::{Company, CompanyForm, company_exists, create_company_table};
pub use create_endpoint::create_company_endpoint;
pub use delete_endpoint::delete_company_endpoint;
pub use edit_endpoint::edit_company_endpoint;
pub use get_endpoint::{get_company_endpoint, list_companies_endpoint};

#[cfg(test)]
pub use self::core::create_company;
