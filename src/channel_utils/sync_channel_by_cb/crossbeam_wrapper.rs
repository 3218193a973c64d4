use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, SendError, Sender};
use std::io::{Error, ErrorKind, Read, Result, Write};
use std::time::Duration;

/// Writing half. Every `write` call becomes one queued chunk.
pub struct CrossbeamSender(Sender<Vec<u8>>);

/// Reading half. `D` is the timeout in milliseconds for waiting on the next chunk.
pub struct CrossbeamReceiver<const D: u64> {
    rx: Receiver<Vec<u8>>,
    buf: Vec<u8>,
    pos: usize,
}

impl Write for CrossbeamSender {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if let Err(SendError(v)) = self.0.send(buf.to_vec()) {
            return Err(Error::new(ErrorKind::BrokenPipe, SendError(v)));
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<const D: u64> Read for CrossbeamReceiver<D> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if self.pos == self.buf.len() {
            match self.rx.recv_timeout(Duration::from_millis(D)) {
                Ok(chunk) => {
                    self.buf = chunk;
                    self.pos = 0;
                }
                Err(RecvTimeoutError::Timeout) => return Ok(0),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(Error::new(
                        ErrorKind::BrokenPipe,
                        RecvTimeoutError::Disconnected,
                    ))
                }
            }
        }

        let n = buf.len().min(self.buf.len() - self.pos);
        buf[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;

        Ok(n)
    }
}

pub fn cbch_pair<const D: u64>() -> (CrossbeamSender, CrossbeamReceiver<D>) {
    let (s, r) = unbounded();
    (
        CrossbeamSender(s),
        CrossbeamReceiver {
            rx: r,
            buf: Vec::new(),
            pos: 0,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use scuttlebutt::{AbstractChannel, SyncChannel};

    const TIMEOUT: u64 = 100;

    #[test]
    fn test() {
        let (mut s1, mut r1) = cbch_pair::<TIMEOUT>();

        let handle = std::thread::spawn(move || {
            let mut v = vec![0u8; 3];
            r1.read_exact(&mut v).unwrap();
            assert_eq!(v, [1, 2, 3]);
        });

        let v = [1, 2, 3];
        s1.write_all(&v).unwrap();

        handle.join().unwrap();
    }

    #[test]
    fn test_split_reads() {
        let (mut s1, mut r1) = cbch_pair::<TIMEOUT>();

        s1.write_all(&[1, 2, 3, 4, 5]).unwrap();
        s1.write_all(&[6]).unwrap();

        let mut v = [0u8; 2];
        r1.read_exact(&mut v).unwrap();
        assert_eq!(v, [1, 2]);

        let mut v = [0u8; 4];
        r1.read_exact(&mut v).unwrap();
        assert_eq!(v, [3, 4, 5, 6]);
    }

    #[test]
    fn test_timeout_is_short_read() {
        let (_s1, mut r1) = cbch_pair::<TIMEOUT>();

        let mut v = [0u8; 1];
        let e = r1.read_exact(&mut v).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_broken_pipe() {
        let (mut s1, mut r1) = cbch_pair::<TIMEOUT>();

        let handle = std::thread::spawn(move || {
            let mut v = vec![0u8; 3];
            r1.read_exact(&mut v).unwrap();
            assert_eq!(v, [1, 2, 3]);

            let mut v = vec![0u8; 3];
            let e = r1.read_exact(&mut v).unwrap_err();
            assert_eq!(e.kind(), ErrorKind::BrokenPipe);
        });

        let v = [1, 2, 3];
        s1.write_all(&v).unwrap();
        drop(s1);

        handle.join().unwrap();
    }

    #[test]
    fn test_channel() {
        let (s1, r1) = cbch_pair::<TIMEOUT>();
        let (s2, r2) = cbch_pair::<TIMEOUT>();
        let mut ch1 = SyncChannel::new(r1, s2);
        let mut ch2 = SyncChannel::new(r2, s1);

        let handle = std::thread::spawn(move || {
            let n = ch1.read_u32().unwrap();
            assert_eq!(n, 123);
            ch1.write_u32(n * 2).unwrap();
        });

        let n = 123;
        ch2.write_u32(n).unwrap();
        let n = ch2.read_u32().unwrap();
        assert_eq!(n, 246);

        handle.join().unwrap();
    }
}
