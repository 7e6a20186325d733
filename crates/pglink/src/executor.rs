//! Query execution entry points.
//!
//! Blocking calls run one command to completion and hand back a single
//! [`PgResult`]. Server-side failures are data at this level: the
//! result arrives error-classified and [`PgResult::check`] raises it.
//! A Rust error from these methods means the command itself could not
//! be carried out (broken link, closed connection, unencodable
//! parameter).
//!
//! The streaming variants submit the command, then pull results one
//! row at a time through [`crate::stream`], which owns the drain
//! discipline that keeps the connection reusable afterwards.

use pglink_core::{Error, Result, Value};

use crate::connection::Connection;
use crate::result::PgResult;
use crate::stream::{self, RowControl};
use crate::transport::RawResult;
use crate::types::WireParam;

impl Connection {
    /// Run a plain command to completion.
    ///
    /// The command string may contain multiple statements; only the
    /// last result is reported.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn exec(&mut self, command: &str) -> Result<PgResult> {
        let raw = self.transport()?.exec(command);
        self.finish_blocking(raw)
    }

    /// Run a single parameterized command (`$1`, `$2`, ...) to completion.
    #[tracing::instrument(level = "debug", skip(self, params))]
    pub fn exec_params(&mut self, command: &str, params: &[Value]) -> Result<PgResult> {
        let wire = self.encode_params(params)?;
        let raw = self.transport()?.exec_params(command, &wire);
        self.finish_blocking(raw)
    }

    /// Create a named prepared statement.
    ///
    /// `param_types` pre-declares parameter OIDs; leave it empty to let
    /// the server infer them from use.
    #[tracing::instrument(level = "debug", skip(self, param_types))]
    pub fn prepare(&mut self, name: &str, command: &str, param_types: &[u32]) -> Result<PgResult> {
        let raw = self.transport()?.prepare(name, command, param_types);
        self.finish_blocking(raw)
    }

    /// Run a previously prepared statement to completion.
    #[tracing::instrument(level = "debug", skip(self, params))]
    pub fn exec_prepared(&mut self, name: &str, params: &[Value]) -> Result<PgResult> {
        let wire = self.encode_params(params)?;
        let raw = self.transport()?.exec_prepared(name, &wire);
        self.finish_blocking(raw)
    }

    /// Fetch parameter and column metadata for a prepared statement.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn describe_prepared(&mut self, name: &str) -> Result<PgResult> {
        let raw = self.transport()?.describe_prepared(name);
        self.finish_blocking(raw)
    }

    /// Fetch column metadata for an open portal.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn describe_portal(&mut self, name: &str) -> Result<PgResult> {
        let raw = self.transport()?.describe_portal(name);
        self.finish_blocking(raw)
    }

    /// Run a command, delivering results one row at a time.
    ///
    /// Each delivered [`PgResult`] holds either a single row or a
    /// non-tuple classification (errors included); the callback decides
    /// per result whether to continue or stop via [`RowControl`]. On
    /// every exit path the remaining results are drained, so the
    /// connection is ready for the next command.
    #[tracing::instrument(level = "debug", skip(self, params, on_row))]
    pub fn exec_streaming<F>(&mut self, command: &str, params: &[Value], on_row: F) -> Result<()>
    where
        F: FnMut(PgResult) -> Result<RowControl>,
    {
        let wire = self.encode_params(params)?;
        let submitted = {
            let transport = self.transport()?;
            if params.is_empty() {
                transport.send_query(command)
            } else {
                transport.send_query_params(command, &wire)
            }
        };
        self.deliver_notices();
        submitted?;
        stream::consume(self, on_row)
    }

    /// Run a prepared statement, delivering results one row at a time.
    #[tracing::instrument(level = "debug", skip(self, params, on_row))]
    pub fn exec_prepared_streaming<F>(
        &mut self,
        name: &str,
        params: &[Value],
        on_row: F,
    ) -> Result<()>
    where
        F: FnMut(PgResult) -> Result<RowControl>,
    {
        let wire = self.encode_params(params)?;
        let submitted = self.transport()?.send_query_prepared(name, &wire);
        self.deliver_notices();
        submitted?;
        stream::consume(self, on_row)
    }

    /// Wrap up one blocking call: notices first, then the result.
    fn finish_blocking(&mut self, raw: Result<RawResult>) -> Result<PgResult> {
        self.deliver_notices();
        let raw = raw?;
        Ok(self.wrap_result(raw))
    }

    /// Encode a parameter list in text format.
    fn encode_params(&self, params: &[Value]) -> Result<Vec<WireParam>> {
        let mut wire = Vec::with_capacity(params.len());
        for (index, value) in params.iter().enumerate() {
            let param = self
                .codec()
                .encode_text(value)
                .map_err(|err| tag_param_index(err, index))?;
            wire.push(param);
        }
        Ok(wire)
    }
}

/// Stamp the bind-list position onto an encode rejection.
fn tag_param_index(err: Error, index: usize) -> Error {
    match err {
        Error::UnsupportedParameterType(mut param) => {
            param.index = Some(index);
            Error::UnsupportedParameterType(param)
        }
        other => other,
    }
}
