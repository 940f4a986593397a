//! SQLite reference store implementation.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};

use super::database::connection::DbPool;
use super::database::model::{
    AccountRow, ChainRow, DtcRow, MakerAddressRow, MakerGroupRow, NewTokenRow, SwapTokenRow,
    TokenRow,
};
use super::database::schema::{
    t_account, t_chain_info, t_dynamic_dtc, t_maker_address_groups, t_swap_token_info,
    t_token_info,
};
use crate::domain::TokenInfo;
use crate::error::{Error, Result};
use crate::port::outbound::store::{
    AccountRecord, ChainRecord, DtcRecord, MakerAddressRecord, MakerGroupRecord, ReferenceStore,
    TokenRecord,
};

type Conn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// SQLite-backed [`ReferenceStore`].
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<Conn> {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }
}

fn db(e: diesel::result::Error) -> Error {
    Error::Database(e.to_string())
}

fn records<R, T: Into<R>>(rows: Vec<T>) -> Vec<R> {
    rows.into_iter().map(Into::into).collect()
}

impl ReferenceStore for SqliteStore {
    fn load_chains(&self) -> Result<Vec<ChainRecord>> {
        let rows = t_chain_info::table
            .order(t_chain_info::id)
            .select(ChainRow::as_select())
            .load(&mut self.conn()?)
            .map_err(db)?;
        Ok(records(rows))
    }

    fn load_tokens(&self) -> Result<Vec<TokenRecord>> {
        let rows = t_token_info::table
            .order(t_token_info::id)
            .select(TokenRow::as_select())
            .load(&mut self.conn()?)
            .map_err(db)?;
        Ok(records(rows))
    }

    fn load_accounts(&self) -> Result<Vec<AccountRecord>> {
        let rows = t_account::table
            .order(t_account::id)
            .select(AccountRow::as_select())
            .load(&mut self.conn()?)
            .map_err(db)?;
        Ok(records(rows))
    }

    fn load_maker_groups(&self) -> Result<Vec<MakerGroupRecord>> {
        let rows = t_maker_address_groups::table
            .order(t_maker_address_groups::id)
            .select(MakerGroupRow::as_select())
            .load(&mut self.conn()?)
            .map_err(db)?;
        Ok(records(rows))
    }

    fn load_maker_addresses(&self) -> Result<Vec<MakerAddressRecord>> {
        use super::database::schema::t_maker_addresses::dsl::*;
        let rows = t_maker_addresses
            .order(id)
            .select((id, group_id, backend, address))
            .load::<MakerAddressRow>(&mut self.conn()?)
            .map_err(db)?;
        Ok(records(rows))
    }

    fn load_security_addresses(&self) -> Result<Vec<MakerAddressRecord>> {
        use super::database::schema::t_security_addresses::dsl::*;
        let rows = t_security_addresses
            .order(id)
            .select((id, group_id, backend, address))
            .load::<MakerAddressRow>(&mut self.conn()?)
            .map_err(db)?;
        Ok(records(rows))
    }

    fn load_dtcs(&self) -> Result<Vec<DtcRecord>> {
        let rows = t_dynamic_dtc::table
            .order(t_dynamic_dtc::id)
            .select(DtcRow::as_select())
            .load(&mut self.conn()?)
            .map_err(db)?;
        Ok(records(rows))
    }

    fn find_token(&self, chain_name: &str, token_address: &str) -> Result<Option<TokenRecord>> {
        let row = t_token_info::table
            .filter(t_token_info::chain_name.eq(chain_name))
            .filter(t_token_info::token_address.eq(token_address))
            .select(TokenRow::as_select())
            .first(&mut self.conn()?)
            .optional()
            .map_err(db)?;
        Ok(row.map(Into::into))
    }

    fn find_swap_token(
        &self,
        chain_name: &str,
        token_address: &str,
    ) -> Result<Option<TokenRecord>> {
        let row = t_swap_token_info::table
            .filter(t_swap_token_info::chain_name.eq(chain_name))
            .filter(t_swap_token_info::token_address.eq(token_address))
            .select(SwapTokenRow::as_select())
            .first(&mut self.conn()?)
            .optional()
            .map_err(db)?;
        Ok(row.map(Into::into))
    }

    fn insert_token_ignore(&self, token: &TokenInfo) -> Result<bool> {
        let written = diesel::insert_or_ignore_into(t_token_info::table)
            .values(NewTokenRow::from(token))
            .execute(&mut self.conn()?)
            .map_err(db)?;
        Ok(written > 0)
    }
}
