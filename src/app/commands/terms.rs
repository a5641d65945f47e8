use crate::app::AppContext;
use crate::domain::{AppError, Contract};
use crate::ports::MarketplaceClient;

pub fn execute<C: MarketplaceClient>(ctx: &AppContext<C>) -> Result<Contract, AppError> {
    ctx.client().fetch_contract_terms()
}
