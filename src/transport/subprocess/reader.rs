//! Line reading for session process output

use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::FramedRead;
use uuid::Uuid;

use crate::message::framing::LineFramer;
use crate::types::events::StreamKind;

/// A framed line tagged with the stream it came from
pub(crate) type TaggedLine = (StreamKind, String);

/// Spawn a task that frames `reader` into lines and forwards them in order
///
/// The task ends at end of stream (after flushing any trailing fragment), on a
/// read error, or when the receiving side is dropped.
pub(crate) fn spawn_line_reader<R>(
    reader: R,
    stream: StreamKind,
    max_line_bytes: usize,
    lines: mpsc::UnboundedSender<TaggedLine>,
    run_id: Uuid,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut framed = FramedRead::new(reader, LineFramer::new(max_line_bytes));

        while let Some(frame) = framed.next().await {
            match frame {
                Ok(line) => {
                    if lines.send((stream, line)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::warn!("[{run_id}] {stream} read failed: {e}");
                    break;
                }
            }
        }

        log::trace!("[{run_id}] {stream} closed");
    })
}
