pub struct Cmd;
impl Cmd {
    // Init
    pub const PANEL_SETTING: u8 = 0x00;
    pub const POWER_OFF: u8 = 0x02;
    pub const POWER_ON: u8 = 0x04;
    pub const BOOSTER_SOFT_START: u8 = 0x06;
    pub const DEEP_SLEEP: u8 = 0x07;
    pub const VCOM_DATA_INTERVAL: u8 = 0x50;
    pub const RESOLUTION_SETTING: u8 = 0x61;

    // Update
    pub const WRITE_BLACK_DATA: u8 = 0x10;
    pub const DISPLAY_REFRESH: u8 = 0x12;
    pub const WRITE_RED_DATA: u8 = 0x13;
}

/*
Panel command set:
0x06 - Booster Soft Start
0x04 - Power On (wait for BUSY)
0x00 - Panel Setting
0x50 - VCOM and Data Interval Setting
0x61 - Resolution Setting
0x10 - Data Start Transmission 1 (black/white plane)
0x13 - Data Start Transmission 2 (red plane)
0x12 - Display Refresh (wait for BUSY)
0x02 - Power Off (wait for BUSY)
0x07 - Deep Sleep (check code 0xA5)
*/
