//! Connection lifecycle and notice delivery.
//!
//! A [`Connection`] owns one boxed [`Transport`] and the [`Codec`]
//! shared by every result it produces. Closing is explicit, idempotent,
//! and severs the transport immediately; any later use reports
//! [`Error::ClosedStream`]. Dropping an open connection closes it.

use std::fmt;
use std::sync::Arc;

use pglink_core::error::{ConnectionError, ConnectionErrorKind};
use pglink_core::{Error, Result};

use crate::result::PgResult;
use crate::transport::{RawResult, Transport, TransportStatus};
use crate::types::Codec;

/// Callback invoked once per server notice, in arrival order.
pub type NoticeCallback = Box<dyn FnMut(&PgResult)>;

/// An established database connection.
pub struct Connection {
    transport: Option<Box<dyn Transport>>,
    codec: Arc<Codec>,
    notice_callback: Option<NoticeCallback>,
}

impl Connection {
    /// Take ownership of an already-linked transport.
    ///
    /// The transport is expected to have attempted its link before it
    /// gets here; one reporting [`TransportStatus::Bad`] is rejected
    /// with its own diagnostic text.
    pub fn connect(transport: Box<dyn Transport>, codec: Codec) -> Result<Self> {
        if transport.status() != TransportStatus::Ok {
            return Err(Error::Connection(ConnectionError::new(
                ConnectionErrorKind::Connect,
                transport.error_message(),
            )));
        }
        tracing::debug!("Connection established");
        Ok(Self {
            transport: Some(transport),
            codec: Arc::new(codec),
            notice_callback: None,
        })
    }

    /// The codec this connection decodes results with.
    #[must_use]
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// The live transport, or the closed-stream error.
    pub(crate) fn transport(&mut self) -> Result<&mut (dyn Transport + 'static)> {
        self.transport.as_deref_mut().ok_or(Error::ClosedStream)
    }

    /// Drain pending notices and hand them to the callback.
    ///
    /// Notices are drained even with no callback installed so they
    /// cannot pile up inside the transport.
    pub(crate) fn deliver_notices(&mut self) {
        let Some(transport) = self.transport.as_deref_mut() else {
            return;
        };
        let notices = transport.take_notices();
        let Some(callback) = self.notice_callback.as_mut() else {
            return;
        };
        for raw in notices {
            let notice = PgResult::new(raw, Arc::clone(&self.codec));
            callback(&notice);
        }
    }

    pub(crate) fn wrap_result(&self, raw: RawResult) -> PgResult {
        PgResult::new(raw, Arc::clone(&self.codec))
    }

    /// Tear down and re-establish the link with the same options.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn reset(&mut self) -> Result<()> {
        let outcome = self.transport()?.reset();
        self.deliver_notices();
        outcome?;
        let transport = self.transport()?;
        if transport.status() != TransportStatus::Ok {
            return Err(Error::Connection(ConnectionError::new(
                ConnectionErrorKind::Reset,
                transport.error_message(),
            )));
        }
        tracing::debug!("Connection reset");
        Ok(())
    }

    /// The OS descriptor of the underlying socket.
    pub fn socket(&self) -> Result<i32> {
        match self.transport.as_deref() {
            Some(transport) => transport.socket(),
            None => Err(Error::ClosedStream),
        }
    }

    /// Ask the server to abandon the in-flight command.
    ///
    /// Success means the request was sent, not that anything was
    /// cancelled; the command may still run to completion.
    pub fn request_cancel(&mut self) -> Result<()> {
        self.transport()?.request_cancel()
    }

    /// Close the connection, releasing the transport.
    ///
    /// Calling close on a closed connection does nothing.
    pub fn close(&mut self) {
        if self.transport.take().is_some() {
            tracing::debug!("Connection closed");
        }
    }

    /// Has this connection been closed?
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.transport.is_none()
    }

    /// Install the notice callback, replacing any existing one.
    pub fn set_notice_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&PgResult) + 'static,
    {
        self.notice_callback = Some(Box::new(callback));
    }

    /// Remove the notice callback; notices are silently dropped again.
    pub fn clear_notice_callback(&mut self) {
        self.notice_callback = None;
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("closed", &self.is_closed())
            .field("notice_callback", &self.notice_callback.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use crate::result::ResultStatus;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn open(mock: MockTransport) -> Connection {
        Connection::connect(Box::new(mock), Codec::new()).unwrap()
    }

    #[test]
    fn test_connect_rejects_bad_transport() {
        let mock = MockTransport::bad("could not connect to server");
        let err = Connection::connect(Box::new(mock), Codec::new()).unwrap_err();

        let Error::Connection(conn_err) = err else {
            panic!("expected connection error");
        };
        assert_eq!(conn_err.kind, ConnectionErrorKind::Connect);
        assert_eq!(conn_err.message, "could not connect to server");
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut conn = open(MockTransport::new());
        assert!(!conn.is_closed());

        conn.close();
        assert!(conn.is_closed());
        conn.close();
        assert!(conn.is_closed());
    }

    #[test]
    fn test_closed_connection_reports_closed_stream() {
        let mut conn = open(MockTransport::new());
        conn.close();

        assert!(matches!(conn.socket(), Err(Error::ClosedStream)));
        assert!(matches!(conn.request_cancel(), Err(Error::ClosedStream)));
        assert!(matches!(conn.reset(), Err(Error::ClosedStream)));
    }

    #[test]
    fn test_socket_passthrough() {
        let mock = MockTransport::new().with_socket(7);
        let conn = open(mock);
        assert_eq!(conn.socket().unwrap(), 7);
    }

    #[test]
    fn test_socket_error_kind() {
        let conn = open(MockTransport::new().without_socket());
        let err = conn.socket().unwrap_err();

        let Error::Connection(conn_err) = err else {
            panic!("expected connection error");
        };
        assert_eq!(conn_err.kind, ConnectionErrorKind::Socket);
    }

    #[test]
    fn test_reset_recovers() {
        let mut conn = open(MockTransport::new());
        conn.reset().unwrap();
    }

    #[test]
    fn test_reset_failure_kind() {
        let mock = MockTransport::new().with_failing_reset("server closed the connection");
        let mut conn = open(mock);

        let err = conn.reset().unwrap_err();
        let Error::Connection(conn_err) = err else {
            panic!("expected connection error");
        };
        assert_eq!(conn_err.kind, ConnectionErrorKind::Reset);
        assert_eq!(conn_err.message, "server closed the connection");
    }

    #[test]
    fn test_request_cancel_reaches_transport() {
        let mock = MockTransport::new();
        let calls = mock.calls();
        let mut conn = open(mock);

        conn.request_cancel().unwrap();
        assert!(calls.borrow().contains(&"request_cancel".to_string()));
    }

    #[test]
    fn test_notice_callback_sees_each_notice() {
        let mut mock = MockTransport::new();
        mock.push_notice(
            RawResult::new(ResultStatus::NonfatalError).with_error("WARNING: first\n"),
        );
        mock.push_notice(
            RawResult::new(ResultStatus::NonfatalError).with_error("WARNING: second\n"),
        );
        let mut conn = open(mock);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        conn.set_notice_callback(move |notice| {
            assert_eq!(notice.status(), ResultStatus::NonfatalError);
            sink.borrow_mut().push(notice.error_message().to_string());
        });

        conn.deliver_notices();
        assert_eq!(
            *seen.borrow(),
            vec!["WARNING: first\n".to_string(), "WARNING: second\n".to_string()]
        );

        // Nothing pending, nothing delivered.
        conn.deliver_notices();
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_notices_drain_without_callback() {
        let mut mock = MockTransport::new();
        mock.push_notice(RawResult::new(ResultStatus::NonfatalError).with_error("dropped\n"));
        let mut conn = open(mock);

        conn.deliver_notices();

        // A callback installed afterwards must not see stale notices.
        let seen = Rc::new(RefCell::new(0_usize));
        let sink = Rc::clone(&seen);
        conn.set_notice_callback(move |_| *sink.borrow_mut() += 1);
        conn.deliver_notices();
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn test_clear_notice_callback() {
        let mut mock = MockTransport::new();
        mock.push_notice(RawResult::new(ResultStatus::NonfatalError).with_error("unseen\n"));
        let mut conn = open(mock);

        conn.set_notice_callback(|_| panic!("callback should have been cleared"));
        conn.clear_notice_callback();
        conn.deliver_notices();
    }

    #[test]
    fn test_debug_omits_internals() {
        let conn = open(MockTransport::new());
        let rendered = format!("{conn:?}");
        assert!(rendered.contains("Connection"));
        assert!(rendered.contains("closed: false"));
    }
}
