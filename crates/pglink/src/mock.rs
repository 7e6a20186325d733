//! A scripted transport for exercising the driver without a server.
//!
//! Blocking calls pop pre-loaded outcomes in order (defaulting to an
//! empty command-ok result when the queue runs dry), streaming pulls
//! pop from a separate queue, and every call is logged by name through
//! a shared handle so tests can assert on routing. A blocking call
//! while streamed results are still queued fails the way a real link
//! would, which is what makes the drain rules observable.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use pglink_core::error::{ConnectionError, ConnectionErrorKind};
use pglink_core::{Error, Result};

use crate::result::ResultStatus;
use crate::transport::{RawResult, Transport, TransportStatus};
use crate::types::WireParam;

pub struct MockTransport {
    status: TransportStatus,
    error_message: String,
    socket: Option<i32>,
    blocking: VecDeque<Result<RawResult>>,
    stream: VecDeque<Result<RawResult>>,
    notices: Vec<RawResult>,
    send_failure: Option<Error>,
    single_row_failure: Option<Error>,
    reset_failure: Option<String>,
    calls: Rc<RefCell<Vec<String>>>,
    params: Rc<RefCell<Vec<Vec<WireParam>>>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// A healthy transport with nothing scripted.
    pub fn new() -> Self {
        Self {
            status: TransportStatus::Ok,
            error_message: String::new(),
            socket: Some(1),
            blocking: VecDeque::new(),
            stream: VecDeque::new(),
            notices: Vec::new(),
            send_failure: None,
            single_row_failure: None,
            reset_failure: None,
            calls: Rc::new(RefCell::new(Vec::new())),
            params: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// A transport whose link never came up.
    pub fn bad(message: impl Into<String>) -> Self {
        let mut mock = Self::new();
        mock.status = TransportStatus::Bad;
        mock.error_message = message.into();
        mock
    }

    #[must_use]
    pub fn with_socket(mut self, fd: i32) -> Self {
        self.socket = Some(fd);
        self
    }

    #[must_use]
    pub fn without_socket(mut self) -> Self {
        self.socket = None;
        self
    }

    /// Make the next reset leave the link broken with this diagnostic.
    #[must_use]
    pub fn with_failing_reset(mut self, message: impl Into<String>) -> Self {
        self.reset_failure = Some(message.into());
        self
    }

    /// Make the next `send_*` call fail.
    #[must_use]
    pub fn with_send_failure(mut self, err: Error) -> Self {
        self.send_failure = Some(err);
        self
    }

    /// Make the next single-row-mode switch fail.
    #[must_use]
    pub fn with_single_row_failure(mut self, err: Error) -> Self {
        self.single_row_failure = Some(err);
        self
    }

    /// Script the outcome of the next blocking call.
    pub fn push_result(&mut self, raw: RawResult) {
        self.blocking.push_back(Ok(raw));
    }

    /// Script the next blocking call to fail outright.
    pub fn push_failure(&mut self, err: Error) {
        self.blocking.push_back(Err(err));
    }

    /// Append results for `next_result` to report, in order.
    pub fn queue_stream(&mut self, results: Vec<RawResult>) {
        self.stream.extend(results.into_iter().map(Ok));
    }

    /// Append a `next_result` failure at the current queue position.
    pub fn queue_stream_failure(&mut self, err: Error) {
        self.stream.push_back(Err(err));
    }

    /// Add a notice for the next `take_notices` to report.
    pub fn push_notice(&mut self, raw: RawResult) {
        self.notices.push(raw);
    }

    /// Shared view of every call made, by method name, in order.
    pub fn calls(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.calls)
    }

    /// Shared view of every parameter list shipped to the transport.
    pub fn recorded_params(&self) -> Rc<RefCell<Vec<Vec<WireParam>>>> {
        Rc::clone(&self.params)
    }

    fn log(&self, call: &str) {
        self.calls.borrow_mut().push(call.to_string());
    }

    fn record_params(&self, params: &[WireParam]) {
        self.params.borrow_mut().push(params.to_vec());
    }

    fn pop_blocking(&mut self) -> Result<RawResult> {
        if !self.stream.is_empty() {
            return Err(Error::Connection(ConnectionError::new(
                ConnectionErrorKind::Command,
                "another command is already in progress",
            )));
        }
        self.blocking
            .pop_front()
            .unwrap_or_else(|| Ok(RawResult::new(ResultStatus::CommandOk)))
    }

    fn take_send_failure(&mut self) -> Result<()> {
        match self.send_failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Transport for MockTransport {
    fn status(&self) -> TransportStatus {
        self.status
    }

    fn exec(&mut self, _command: &str) -> Result<RawResult> {
        self.log("exec");
        self.pop_blocking()
    }

    fn exec_params(&mut self, _command: &str, params: &[WireParam]) -> Result<RawResult> {
        self.log("exec_params");
        self.record_params(params);
        self.pop_blocking()
    }

    fn prepare(&mut self, _name: &str, _command: &str, _param_types: &[u32]) -> Result<RawResult> {
        self.log("prepare");
        self.pop_blocking()
    }

    fn exec_prepared(&mut self, _name: &str, params: &[WireParam]) -> Result<RawResult> {
        self.log("exec_prepared");
        self.record_params(params);
        self.pop_blocking()
    }

    fn describe_prepared(&mut self, _name: &str) -> Result<RawResult> {
        self.log("describe_prepared");
        self.pop_blocking()
    }

    fn describe_portal(&mut self, _name: &str) -> Result<RawResult> {
        self.log("describe_portal");
        self.pop_blocking()
    }

    fn send_query(&mut self, _command: &str) -> Result<()> {
        self.log("send_query");
        self.take_send_failure()
    }

    fn send_query_params(&mut self, _command: &str, params: &[WireParam]) -> Result<()> {
        self.log("send_query_params");
        self.record_params(params);
        self.take_send_failure()
    }

    fn send_query_prepared(&mut self, _name: &str, params: &[WireParam]) -> Result<()> {
        self.log("send_query_prepared");
        self.record_params(params);
        self.take_send_failure()
    }

    fn set_single_row_mode(&mut self) -> Result<()> {
        self.log("set_single_row_mode");
        match self.single_row_failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_result(&mut self) -> Result<Option<RawResult>> {
        self.log("next_result");
        match self.stream.pop_front() {
            None => Ok(None),
            Some(Ok(raw)) => Ok(Some(raw)),
            Some(Err(err)) => Err(err),
        }
    }

    fn request_cancel(&mut self) -> Result<()> {
        self.log("request_cancel");
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.log("reset");
        if let Some(message) = self.reset_failure.take() {
            self.status = TransportStatus::Bad;
            self.error_message = message;
        } else {
            self.status = TransportStatus::Ok;
            self.error_message.clear();
        }
        Ok(())
    }

    fn socket(&self) -> Result<i32> {
        self.socket.ok_or_else(|| {
            Error::Connection(ConnectionError::new(
                ConnectionErrorKind::Socket,
                "no socket descriptor available",
            ))
        })
    }

    fn error_message(&self) -> String {
        self.error_message.clone()
    }

    fn take_notices(&mut self) -> Vec<RawResult> {
        std::mem::take(&mut self.notices)
    }
}
