/// EUI-64 (8 bytes), little endian as expected by the MAC engine
pub type Eui64 = [u8; 8];
/// AES-128 key (16 bytes)
pub type AesKey = [u8; 16];
/// Device address, big endian reading order
pub type DevAddr = u32;
/// Network identifier
pub type NetId = u32;

/// Device activation procedure and its commissioning inputs
///
/// These values are provisioned externally and never modified by the
/// controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    /// Over-the-air activation
    Otaa {
        /// Device EUI (unique device identifier)
        dev_eui: Eui64,
        /// Application EUI (join identifier)
        app_eui: Eui64,
        /// Application key
        app_key: AesKey,
    },
    /// Activation by personalization
    Abp {
        /// Network identifier
        net_id: NetId,
        /// Device address on the network
        dev_addr: DevAddr,
        /// Network session key
        nwk_skey: AesKey,
        /// Application session key
        app_skey: AesKey,
    },
}

impl Activation {
    /// Create an OTAA activation
    pub fn new_otaa(dev_eui: Eui64, app_eui: Eui64, app_key: AesKey) -> Self {
        Activation::Otaa {
            dev_eui,
            app_eui,
            app_key,
        }
    }

    /// Create an ABP activation
    pub fn new_abp(net_id: NetId, dev_addr: DevAddr, nwk_skey: AesKey, app_skey: AesKey) -> Self {
        Activation::Abp {
            net_id,
            dev_addr,
            nwk_skey,
            app_skey,
        }
    }
}
