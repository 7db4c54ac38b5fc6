/// Data bytes that follow the commands in [`super::cmd::Cmd`].
///
/// The values come from the panel vendor's working init sequence and must be sent
/// unchanged and in order.
pub struct Flag;
#[allow(missing_docs)]
impl Flag {
    // Booster Soft Start (0x06): phase A, phase B, phase C1, phase C2
    pub const BOOSTER_SOFT_START: [u8; 4] = [0x17, 0x17, 0x28, 0x17];

    // Panel Setting (0x00)
    pub const PANEL_SETTING_BW_OTP: u8 = 0x0F; // KW-3f KWR-2F BWROTP 0f BWOTP 1f

    // VCOM and Data Interval Setting (0x50): border/data polarity, CDI
    pub const VCOM_DATA_INTERVAL: [u8; 2] = [0x20, 0x07];

    // Resolution Setting (0x61): HRES hi/lo, VRES hi/lo = 648 x 480
    pub const RESOLUTION_648_480: [u8; 4] = [0x02, 0x88, 0x01, 0xE0];

    // Deep Sleep (0x07) check code, the panel ignores the command without it
    pub const DEEP_SLEEP_CHECK: u8 = 0xA5;

    // Red plane data, always blank on this monochrome panel
    pub const RED_PLANE_BLANK: u8 = 0x00;
}
