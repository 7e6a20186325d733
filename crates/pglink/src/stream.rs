//! Single-row result streaming.
//!
//! After a command is submitted, [`consume`] switches the transport to
//! single-row delivery and pulls results one at a time, handing each to
//! the caller's callback. The loop's one hard rule: whatever happens,
//! every remaining result is pulled off the transport before returning.
//! A connection with results still buffered cannot run another command,
//! so skipping the drain would poison it for all future use.

use pglink_core::Result;

use crate::connection::Connection;
use crate::result::{PgResult, ResultStatus};

/// The callback's verdict after each delivered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowControl {
    /// Keep pulling results.
    Continue,
    /// Stop early. Remaining results are drained and discarded, and the
    /// stream ends successfully.
    Cancel,
}

/// Pull every result of the in-flight command through the callback.
///
/// Each delivered [`PgResult`] is either one row
/// ([`ResultStatus::SingleTuple`]) or a non-tuple result such as a
/// command completion or an error classification. The bare end-of-rows
/// marker is not delivered; it carries nothing the callback has not
/// already seen.
pub(crate) fn consume<F>(conn: &mut Connection, mut on_row: F) -> Result<()>
where
    F: FnMut(PgResult) -> Result<RowControl>,
{
    if let Err(err) = conn.transport()?.set_single_row_mode() {
        let _ = conn.transport().and_then(|t| t.request_cancel());
        let _ = drain(conn);
        return Err(err);
    }
    loop {
        let next = conn.transport()?.next_result();
        conn.deliver_notices();
        let raw = match next {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(()),
            Err(err) => {
                let _ = drain(conn);
                return Err(err);
            }
        };
        if raw.status() == ResultStatus::TuplesOk && raw.row_count() == 0 {
            // The bare end marker.
            continue;
        }
        match on_row(conn.wrap_result(raw)) {
            Ok(RowControl::Continue) => {}
            Ok(RowControl::Cancel) => {
                tracing::debug!("Stream cancelled by caller");
                drain(conn)?;
                conn.deliver_notices();
                return Ok(());
            }
            Err(err) => {
                // Cancel first so the drain does not sit through the
                // rest of a large result.
                let _ = conn.transport().and_then(|t| t.request_cancel());
                let _ = drain(conn);
                return Err(err);
            }
        }
    }
}

/// Discard results until the transport reports the command complete.
fn drain(conn: &mut Connection) -> Result<()> {
    while conn.transport()?.next_result()?.is_some() {}
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use crate::transport::{RawColumn, RawResult};
    use crate::types::{Codec, oid};
    use pglink_core::error::ProtocolError;
    use pglink_core::{Error, Value};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn open(mock: MockTransport) -> Connection {
        Connection::connect(Box::new(mock), Codec::new()).unwrap()
    }

    fn single_row(n: i32) -> RawResult {
        RawResult::new(ResultStatus::SingleTuple)
            .with_columns(vec![RawColumn::new("n", oid::INT4)])
            .with_rows(vec![vec![Some(n.to_string().into_bytes())]])
    }

    fn end_marker() -> RawResult {
        RawResult::new(ResultStatus::TuplesOk)
            .with_columns(vec![RawColumn::new("n", oid::INT4)])
            .with_command_tag("SELECT 3")
    }

    #[test]
    fn test_rows_arrive_one_at_a_time() {
        let mut mock = MockTransport::new();
        mock.queue_stream(vec![single_row(1), single_row(2), single_row(3), end_marker()]);
        let mut conn = open(mock);

        let mut seen = Vec::new();
        conn.exec_streaming("SELECT n FROM series", &[], |result| {
            assert_eq!(result.status(), ResultStatus::SingleTuple);
            assert_eq!(result.row_count(), 1);
            seen.push(result.value(0, 0).unwrap());
            Ok(RowControl::Continue)
        })
        .unwrap();

        assert_eq!(seen, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn test_empty_result_invokes_nothing() {
        let mut mock = MockTransport::new();
        mock.queue_stream(vec![end_marker()]);
        let mut conn = open(mock);

        conn.exec_streaming("SELECT n FROM series WHERE false", &[], |_| {
            panic!("no results should be delivered")
        })
        .unwrap();
    }

    #[test]
    fn test_error_results_are_delivered_not_swallowed() {
        let mut mock = MockTransport::new();
        mock.queue_stream(vec![
            single_row(1),
            RawResult::new(ResultStatus::FatalError)
                .with_error("division by zero\n")
                .with_error_field(b'C', "22012"),
        ]);
        let mut conn = open(mock);

        let mut statuses = Vec::new();
        conn.exec_streaming("SELECT 1/0", &[], |result| {
            statuses.push(result.status());
            Ok(RowControl::Continue)
        })
        .unwrap();

        assert_eq!(
            statuses,
            vec![ResultStatus::SingleTuple, ResultStatus::FatalError]
        );
    }

    #[test]
    fn test_cancel_sentinel_stops_and_drains() {
        let mut mock = MockTransport::new();
        mock.queue_stream(vec![
            single_row(1),
            single_row(2),
            single_row(3),
            end_marker(),
        ]);
        mock.push_result(end_marker());
        let calls = mock.calls();
        let mut conn = open(mock);

        let mut delivered = 0;
        conn.exec_streaming("SELECT n FROM big", &[], |_| {
            delivered += 1;
            Ok(RowControl::Cancel)
        })
        .unwrap();

        assert_eq!(delivered, 1);
        // The sentinel is a quiet stop, not a protocol-level cancel.
        assert!(!calls.borrow().contains(&"request_cancel".to_string()));
        // The drain left the connection ready for the next command.
        conn.exec("SELECT 1").unwrap();
    }

    #[test]
    fn test_callback_failure_cancels_then_drains() {
        let mut mock = MockTransport::new();
        mock.queue_stream(vec![single_row(1), single_row(2), end_marker()]);
        mock.push_result(end_marker());
        let calls = mock.calls();
        let mut conn = open(mock);

        let err = conn
            .exec_streaming("SELECT n FROM big", &[], |_| {
                Err(Error::Protocol(ProtocolError {
                    message: "row handler failed".to_string(),
                    type_oid: None,
                    raw_data: None,
                    source: None,
                }))
            })
            .unwrap_err();

        assert_eq!(err.to_string(), "Protocol error: row handler failed");
        assert!(calls.borrow().contains(&"request_cancel".to_string()));
        conn.exec("SELECT 1").unwrap();
    }

    #[test]
    fn test_single_row_mode_failure_still_drains() {
        let mut mock = MockTransport::new().with_single_row_failure(Error::Connection(
            pglink_core::ConnectionError::new(
                pglink_core::ConnectionErrorKind::Command,
                "single-row mode unavailable",
            ),
        ));
        mock.queue_stream(vec![single_row(1), end_marker()]);
        let mut conn = open(mock);

        let err = conn
            .exec_streaming("SELECT n FROM series", &[], |_| {
                panic!("nothing should be delivered")
            })
            .unwrap_err();

        assert!(err.is_connection_error());
        conn.exec("SELECT 1").unwrap();
    }

    #[test]
    fn test_mid_stream_transport_failure() {
        let mut mock = MockTransport::new();
        mock.queue_stream(vec![single_row(1)]);
        mock.queue_stream_failure(Error::Connection(pglink_core::ConnectionError::new(
            pglink_core::ConnectionErrorKind::Command,
            "connection lost mid-stream",
        )));
        mock.queue_stream(vec![single_row(2), end_marker()]);
        let mut conn = open(mock);

        let mut delivered = 0;
        let err = conn
            .exec_streaming("SELECT n FROM series", &[], |_| {
                delivered += 1;
                Ok(RowControl::Continue)
            })
            .unwrap_err();

        assert_eq!(delivered, 1);
        assert!(err.is_connection_error());
        conn.exec("SELECT 1").unwrap();
    }

    #[test]
    fn test_notices_flow_during_stream() {
        let mut mock = MockTransport::new();
        mock.push_notice(RawResult::new(ResultStatus::NonfatalError).with_error("NOTICE: hi\n"));
        mock.queue_stream(vec![single_row(1), end_marker()]);
        let mut conn = open(mock);

        let notices = Rc::new(RefCell::new(0_usize));
        let sink = Rc::clone(&notices);
        conn.set_notice_callback(move |_| *sink.borrow_mut() += 1);

        conn.exec_streaming("SELECT n FROM series", &[], |_| Ok(RowControl::Continue))
            .unwrap();
        assert_eq!(*notices.borrow(), 1);
    }
}
