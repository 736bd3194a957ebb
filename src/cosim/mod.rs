//! 联合仿真边界
//!
//! 两种模式：
//! - **引擎为主**：`CosimBlock` 的 `compute` 同步地把当前输入发给外部步进器，
//!   请求恰好一步，阻塞等待输出返回；
//! - **外部为主**：外部进程持有时钟，每步调用一次 `ExternalMaster::step`
//!   （即 `Simulator::step_tick`）。
//!
//! 这是运行时唯一会阻塞的地方，阻塞期间不会让出给其它块。

// 子模块声明
mod block;
mod master;
mod plant;
mod process;
mod protocol;
mod thread;
mod transport;

// 重新导出公共接口
pub use block::CosimBlock;
pub use master::ExternalMaster;
pub use plant::{IntegratorPlant, PlantModel, serve};
pub use process::ProcessTransport;
pub use protocol::{PlantRequest, PlantResponse};
pub use thread::ThreadTransport;
pub use transport::{PlantTransport, TransportError};
