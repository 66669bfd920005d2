//! Fixed copy for the Arctic Guide: the persona prompt, the product catalogue
//! and the canned replies shown when the model cannot answer.

pub const GUIDE_NAME: &str = "Гид Arctic";

pub const GREETING: &str = "Добро пожаловать. Готовы погрузиться в холод?";
pub const OFFLINE_REPLY: &str =
    "Не могу получить доступ к базе данных восстановления. (Отсутствует API Key)";
pub const FAILURE_REPLY: &str = "Соединение заморожено. Попробуйте еще раз.";
pub const EMPTY_REPLY: &str = "Анализирую метрики восстановления...";

pub const INPUT_PLACEHOLDER: &str = "Спросите о восстановлении...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub name: &'static str,
    pub summary: &'static str,
    pub price_usd: u32,
}

pub const CATALOG: [Product; 4] = [
    Product {
        name: "The Polar Tub",
        summary: "Начальный уровень, портативная",
        price_usd: 150,
    },
    Product {
        name: "Grizzly Pro",
        summary: "Жесткий корпус, размер XL для атлетов",
        price_usd: 800,
    },
    Product {
        name: "Kodiak Chiller",
        summary: "Охладитель 0.8HP с Wi-Fi, держит воду 3°C",
        price_usd: 1200,
    },
    Product {
        name: "Arctic Barrel",
        summary: "Премиальный кедр, дизайн",
        price_usd: 2000,
    },
];

pub const RECOVERY_TIPS: [&str; 3] = [
    "Начинайте медленно (15°C).",
    "Дышите глубоко.",
    "2-3 минуты достаточно.",
];

/// Builds the prompt the conversation is created with.
pub fn system_instruction() -> String {
    let products = CATALOG
        .iter()
        .map(|p| format!("- {}: {}, {}$.", p.name, p.summary, p.price_usd))
        .collect::<Vec<_>>()
        .join("\n");

    let tips = RECOVERY_TIPS
        .iter()
        .map(|tip| format!("- {}", tip))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Ты - '{GUIDE_NAME}', эксперт по здоровью и восстановлению, специализирующийся на терапии холодом (криотерапии).\n\n\
         Твоя роль: Обучать пользователей преимуществам воздействия холода (метод Вима Хофа, дофамин, снижение воспаления) \
         и рассказывать о линейке продуктов Arctic Bear.\n\
         Тон: Вдохновляющий, экспертный, дисциплинированный и \"крутой\". Отвечай только на русском языке.\n\n\
         Продукты:\n{products}\n\n\
         Ключевые советы:\n{tips}\n\n\
         Будь краток и мотивируй пользователя."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_lists_catalog() {
        let instruction = system_instruction();

        for product in CATALOG {
            assert!(instruction.contains(product.name), "missing {}", product.name);
        }
        assert!(instruction.contains("- Arctic Barrel: Премиальный кедр, дизайн, 2000$."));
        assert!(instruction.contains("Отвечай только на русском языке"));
        assert!(instruction.contains("15°C"));
    }

    #[test]
    fn test_catalog_is_sorted_by_price() {
        assert!(CATALOG.windows(2).all(|w| w[0].price_usd < w[1].price_usd));
    }
}
