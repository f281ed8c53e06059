//! Console rendering of progression events: the terminal stand-in for the
//! web UI's level-up banner and realm modal.

use zen_core::ProgressionObserver;

pub struct ConsoleObserver;

impl ProgressionObserver for ConsoleObserver {
    fn level_up(&self, level: u32) {
        println!("🎉 恭喜升级！你已达到第 {level} 层境界");
    }

    fn realm_level_up(&self, level: u32, realm_name: &str, quote: &str) {
        println!("✨ 境界提升：{realm_name}（{level}级）");
        println!("   {quote}");
    }
}
