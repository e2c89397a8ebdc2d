use esp_hal::{
    uart::{TxError, Uart, UartTx},
    Async,
};
use log::warn;
use traplogger::{
    config::{COMMAND_LINE_MAX, RESPONSE_CHUNK_MAX},
    protocol::ERR_LINE_TOO_LONG,
    ChunkedWriter, LineReadEvent, LineReader,
};

use super::board::{uptime_ms, SharedContext};

pub(crate) type SerialUart = Uart<'static, Async>;

#[embassy_executor::task]
pub(crate) async fn command_task(uart: SerialUart, context: &'static SharedContext) {
    let (mut rx, mut tx) = uart.split();
    let mut reader = LineReader::new();
    let mut byte = [0u8; 1];

    loop {
        match rx.read_async(&mut byte).await {
            Ok(1) => {}
            Ok(_) => continue,
            Err(err) => {
                warn!("serial: rx error {:?}", err);
                continue;
            }
        }

        let mut line = heapless::String::<COMMAND_LINE_MAX>::new();
        match reader.push_byte(byte[0]) {
            LineReadEvent::None => continue,
            LineReadEvent::Overflow => {
                warn!("serial: command line overflow");
                let _ = write_all(&mut tx, ERR_LINE_TOO_LONG.as_bytes());
                let _ = write_all(&mut tx, b"\r\n");
                continue;
            }
            LineReadEvent::Complete(bytes) => match core::str::from_utf8(bytes) {
                // Fits: the reader never frames more than COMMAND_LINE_MAX bytes.
                Ok(text) => {
                    let _ = line.push_str(text);
                }
                Err(_) => {
                    warn!("serial: dropping non-utf8 line");
                    continue;
                }
            },
        }

        let mut trap = context.lock().await;
        let mut out = ChunkedWriter::<_, RESPONSE_CHUNK_MAX>::new(|chunk: &[u8]| write_all(&mut tx, chunk));
        let written = trap.handle_line(&line, uptime_ms(), &mut out);
        if written.is_err() || out.flush().is_err() {
            warn!("serial: response truncated");
        }
    }
}

fn write_all(tx: &mut UartTx<'static, Async>, mut bytes: &[u8]) -> Result<(), TxError> {
    while !bytes.is_empty() {
        let sent = tx.write(bytes)?;
        bytes = &bytes[sent..];
    }
    tx.flush()
}
