pub mod control_interface;
pub mod gesture_detector;
pub mod gesture_state;
pub mod touch_listener;
pub mod virtual_device;
pub mod wake_trigger;

pub use control_interface::ControlInterface;
pub use gesture_detector::GestureDetector;
pub use gesture_state::GestureState;
pub use touch_listener::create_touch_listener;
pub use virtual_device::VirtualDevice;
pub use wake_trigger::WakeTrigger;
