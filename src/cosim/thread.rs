//! 线程传输
//!
//! 在进程内的 worker 线程上运行 `PlantModel`，通过通道交换与进程传输相同的消息。
//! worker 退出时把模型交还，因此可以再次 `open`。
//!
//! 应答超时后 worker 被放弃：请求通道关闭，线程做完手上这一步后自行退出。
//! 下一次 `open` 会等它退出并取回模型，迟到的应答随旧通道一起丢弃。

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::plant::PlantModel;
use super::protocol::{PlantRequest, PlantResponse};
use super::transport::{PlantTransport, TransportError};
use crate::signal::Signals;
use tracing::{debug, warn};

struct Worker {
    requests: Sender<PlantRequest>,
    responses: Receiver<PlantResponse>,
    handle: JoinHandle<Box<dyn PlantModel>>,
}

/// 进程内 worker 线程传输
pub struct ThreadTransport {
    model: Option<Box<dyn PlantModel>>,
    timeout: Option<Duration>,
    worker: Option<Worker>,
    abandoned: Option<JoinHandle<Box<dyn PlantModel>>>,
}

impl ThreadTransport {
    pub fn new(model: impl PlantModel + 'static) -> Self {
        Self {
            model: Some(Box::new(model)),
            timeout: None,
            worker: None,
            abandoned: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn request(&mut self, req: PlantRequest) -> Result<PlantResponse, TransportError> {
        let worker = self.worker.as_ref().ok_or(TransportError::NotOpen)?;
        let received = match worker.requests.send(req) {
            Err(_) => Err(TransportError::Closed),
            Ok(()) => match self.timeout {
                Some(d) => worker.responses.recv_timeout(d).map_err(|e| match e {
                    RecvTimeoutError::Timeout => TransportError::Timeout(d),
                    RecvTimeoutError::Disconnected => TransportError::Closed,
                }),
                None => worker.responses.recv().map_err(|_| TransportError::Closed),
            },
        };
        if received.is_err() {
            self.abandon();
        }
        received
    }

    fn abandon(&mut self) {
        if let Some(worker) = self.worker.take() {
            warn!("plant 线程无应答，放弃该 worker");
            drop(worker.requests);
            self.abandoned = Some(worker.handle);
        }
    }
}

impl PlantTransport for ThreadTransport {
    fn open(&mut self) -> Result<(), TransportError> {
        if self.worker.is_some() {
            return Ok(());
        }
        if self.model.is_none() {
            if let Some(handle) = self.abandoned.take() {
                // 等被放弃的 worker 做完最后一步
                self.model = Some(handle.join().map_err(|_| TransportError::Closed)?);
            }
        }
        let mut model = self.model.take().ok_or(TransportError::Closed)?;

        let (req_tx, req_rx) = mpsc::channel::<PlantRequest>();
        let (resp_tx, resp_rx) = mpsc::channel::<PlantResponse>();
        let handle = thread::spawn(move || {
            while let Ok(req) = req_rx.recv() {
                let resp = match req {
                    PlantRequest::Step { inputs } => match model.step(&inputs) {
                        Ok(outputs) => PlantResponse::Outputs { outputs },
                        Err(message) => PlantResponse::Error { message },
                    },
                    PlantRequest::Reset => match model.reset() {
                        Ok(()) => PlantResponse::Ack,
                        Err(message) => PlantResponse::Error { message },
                    },
                    PlantRequest::Close => break,
                };
                if resp_tx.send(resp).is_err() {
                    break;
                }
            }
            model
        });

        debug!("plant 线程已启动");
        self.worker = Some(Worker {
            requests: req_tx,
            responses: resp_rx,
            handle,
        });
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.worker.is_some()
    }

    fn step(&mut self, inputs: &Signals) -> Result<Signals, TransportError> {
        self.request(PlantRequest::Step {
            inputs: inputs.clone(),
        })?
        .into_outputs()
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        self.request(PlantRequest::Reset)?.into_ack()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        let _ = worker.requests.send(PlantRequest::Close);
        drop(worker.requests);
        match worker.handle.join() {
            Ok(model) => self.model = Some(model),
            Err(_) => warn!("plant 线程异常退出"),
        }
        Ok(())
    }
}

impl Drop for ThreadTransport {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
