use crate::error::RegistrarError;
use registrar_feed::types::{ChangeRecord, ChangeTable};

pub trait ChangeRepository {
    fn append(&self, change: ChangeRecord) -> Result<ChangeRecord, RegistrarError>;
    fn list(
        &self,
        after: Option<i64>,
        limit: Option<u32>,
        table: Option<ChangeTable>,
    ) -> Result<Vec<ChangeRecord>, RegistrarError>;
}
